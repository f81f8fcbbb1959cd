//! Pseudo-terminal capture adapter
//!
//! [`PtyCapturer`] implements the [`Capturer`](warden_application::Capturer)
//! port with POSIX `openpty`. Other platforms get a capturer that always
//! reports [`CaptureError::Unsupported`](warden_application::CaptureError).

#[cfg(unix)]
mod pty;

#[cfg(unix)]
pub use pty::PtyCapturer;

#[cfg(not(unix))]
mod unsupported {
    use warden_application::{CaptureError, CaptureRequest, Capturer};
    use warden_domain::CaptureResult;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct PtyCapturer;

    impl PtyCapturer {
        pub fn new() -> Self {
            Self
        }
    }

    impl Capturer for PtyCapturer {
        fn try_capture(&self, _request: &CaptureRequest) -> Result<CaptureResult, CaptureError> {
            Err(CaptureError::Unsupported)
        }
    }
}

#[cfg(not(unix))]
pub use unsupported::PtyCapturer;
