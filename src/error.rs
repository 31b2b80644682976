use derive_more::derive::{Display, Error};
use i2cdev::linux::LinuxI2CError;
use nix::errno::Errno;

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Every variant maps onto a POSIX error code: [`Error::errno`] returns the
/// code and [`Error::errno_name`] its symbolic name (`"EINVAL"`,
/// `"EREMOTEIO"`, ...), matching what `strerrorname_np` would report for the
/// same condition.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// The controller has no open transport: `open` was never called, it
    /// failed, or `close` already ran.
    #[display("device is not open")]
    NotOpen,

    /// An argument was outside its documented range. The detail names the
    /// offending parameter.
    #[display("invalid argument: {detail}")]
    InvalidArgument {
        /// The parameter at fault, or a short description when the fault
        /// spans more than one.
        #[error(not(source))]
        detail: String,
    },

    /// A channel handle outlived its controller.
    #[display("controller is no longer reachable")]
    ControllerGone,

    /// The underlying bus transaction failed; carries the transport's own
    /// error code unchanged.
    #[display("{_0}")]
    Transport(Errno),
}

impl Error {
    pub(crate) fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::InvalidArgument {
            detail: detail.into(),
        }
    }

    /// The POSIX error code this failure maps onto.
    #[must_use]
    pub fn errno(&self) -> Errno {
        match self {
            Self::NotOpen => Errno::EBADF,
            Self::InvalidArgument { .. } => Errno::EINVAL,
            Self::ControllerGone => Errno::ENODEV,
            Self::Transport(errno) => *errno,
        }
    }

    /// Symbolic name of [`Error::errno`], e.g. `"ENOENT"`.
    #[must_use]
    pub fn errno_name(&self) -> String {
        format!("{:?}", self.errno())
    }
}

impl From<LinuxI2CError> for Error {
    fn from(err: LinuxI2CError) -> Self {
        match err {
            LinuxI2CError::Errno(errno) => Self::Transport(Errno::from_raw(errno)),
            LinuxI2CError::Io(io) => {
                Self::Transport(io.raw_os_error().map_or(Errno::EIO, Errno::from_raw))
            }
        }
    }
}

impl embedded_hal::pwm::Error for Error {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_names_match_posix_spelling() {
        assert_eq!(Error::NotOpen.errno_name(), "EBADF");
        assert_eq!(Error::invalid_argument("frequency").errno_name(), "EINVAL");
        assert_eq!(Error::ControllerGone.errno_name(), "ENODEV");
        assert_eq!(Error::Transport(Errno::ENOENT).errno_name(), "ENOENT");
        assert_eq!(Error::Transport(Errno::EREMOTEIO).errno_name(), "EREMOTEIO");
    }

    #[test]
    fn invalid_argument_display_names_the_parameter() {
        let err = Error::invalid_argument("on_time");
        assert_eq!(err.to_string(), "invalid argument: on_time");
    }

    #[test]
    fn i2cdev_errors_pass_their_code_through() {
        let bus = Error::from(LinuxI2CError::Errno(Errno::EREMOTEIO as i32));
        assert_eq!(bus.errno_name(), "EREMOTEIO");

        let io = std::io::Error::from_raw_os_error(Errno::ENOENT as i32);
        assert_eq!(Error::from(LinuxI2CError::Io(io)).errno_name(), "ENOENT");

        // An io error with no OS code still lands on a bus-failure errno.
        let opaque = std::io::Error::other("bus fell over");
        assert_eq!(Error::from(LinuxI2CError::Io(opaque)).errno_name(), "EIO");
    }
}
