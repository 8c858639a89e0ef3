//! [`Error`]-related definitions.

use std::{fmt, process::ExitCode};

use derive_more::Error as StdError;
use itertools::Itertools as _;
use service::{
    command::{add_vehicle, lease_vehicle, remove_vehicle, sell_vehicle},
    infra::database,
    query,
};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[exit = $exit_code:literal]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            exit_code: $exit_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

define_error! {
    enum DealershipError {
        #[code = "VEHICLE_NOT_EXISTS"]
        #[exit = 3]
        #[message = "`Vehicle` is not in the inventory"]
        VehicleNotExists,

        #[code = "VEHICLE_TOO_OLD"]
        #[exit = 4]
        #[message = "`Vehicle` is too old to be leased"]
        VehicleTooOld,

        #[code = "VIN_OCCUPIED"]
        #[exit = 5]
        #[message = "`Vehicle` with this VIN is in the inventory already"]
        VinOccupied,
    }
}

/// Command-line application [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// Process exit code of this [`Error`].
    pub exit_code: u8,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Exit code of an [`Error::internal()`].
    pub const INTERNAL_EXIT_CODE: u8 = 1;

    /// Create a new [`Error`] representing an internal error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_ERROR",
            exit_code: Self::INTERNAL_EXIT_CODE,
            message: msg.to_string(),
            backtrace: None,
        }
    }

    /// Replaces the message of this [`Error`] with the provided one.
    #[must_use]
    pub fn with_message(self, msg: &impl ToString) -> Self {
        Self {
            message: msg.to_string(),
            ..self
        }
    }

    /// Returns the [`ExitCode`] the process should exit with.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_code)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            exit_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("", |trace, f| f(&format_args!("\n{trace}"))),
        )
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for sell_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use sell_vehicle::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::VehicleNotExists(_) => Some(
                Error::from(DealershipError::VehicleNotExists)
                    .with_message(self),
            ),
        }
    }
}

impl AsError for lease_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use lease_vehicle::ExecutionError as E;

        let kind = match self {
            E::Db(e) => return e.try_as_error(),
            E::VehicleNotExists(_) => DealershipError::VehicleNotExists,
            E::VehicleTooOld { .. } => DealershipError::VehicleTooOld,
        };
        Some(Error::from(kind).with_message(self))
    }
}

impl AsError for add_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use add_vehicle::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::VinOccupied(_) => Some(
                Error::from(DealershipError::VinOccupied).with_message(self),
            ),
        }
    }
}

impl AsError for remove_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use remove_vehicle::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::VehicleNotExists(_) => Some(
                Error::from(DealershipError::VehicleNotExists)
                    .with_message(self),
            ),
        }
    }
}

impl AsError for query::vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use query::vehicle::ExecutionError as E;

        match self {
            E::Db(e) => e.try_as_error(),
            E::VehicleNotExists(_) => Some(
                Error::from(DealershipError::VehicleNotExists)
                    .with_message(self),
            ),
        }
    }
}
