//! Turning panic payloads back into errors.
//!
//! ```
//! use tsu_recover::panic::into_error;
//!
//! assert_eq!(into_error(Box::new("boom")).to_string(), "boom");
//! assert_eq!(into_error(Box::new(42_i32)).to_string(), "42");
//! ```

use std::any::Any;

use crate::error::{BoxError, Error};

/// Classifies a panic payload.
///
/// Payloads that already are errors pass through untouched: an [`Error`] is
/// returned as-is and a [`BoxError`] is wrapped without re-allocation, so
/// its concrete type can still be downcast. Strings and primitive values
/// become a message with their `Display` form. Anything else falls back to
/// its `Debug` form.
pub fn into_error(payload: Box<dyn Any + Send>) -> Error {
    let payload = match payload.downcast::<Error>() {
        Ok(err) => return *err,
        Err(other) => other,
    };
    let payload = match payload.downcast::<BoxError>() {
        Ok(err) => return Error::from_boxed(*err),
        Err(other) => other,
    };
    Error::msg(describe(&*payload))
}

macro_rules! display_any {
    ($payload:expr, $($ty:ty),+ $(,)?) => {
        $(
            if let Some(value) = $payload.downcast_ref::<$ty>() {
                return value.to_string();
            }
        )+
    };
}

fn describe(payload: &(dyn Any + Send)) -> String {
    display_any!(
        payload,
        &'static str, String,
        i8, i16, i32, i64, i128, isize,
        u8, u16, u32, u64, u128, usize,
        f32, f64, bool, char,
    );
    format!("{payload:?}")
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use rstest::rstest;

    use super::*;

    #[derive(Debug)]
    struct Timeout;

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("upstream timed out")
        }
    }

    impl std::error::Error for Timeout {}

    #[rstest]
    #[case::static_str(Box::new("boom"), "boom")]
    #[case::string(Box::new(String::from("boom")), "boom")]
    #[case::int(Box::new(42_i32), "42")]
    #[case::unsigned(Box::new(7_u64), "7")]
    #[case::float(Box::new(1.5_f64), "1.5")]
    #[case::boolean(Box::new(true), "true")]
    #[case::character(Box::new('x'), "x")]
    fn plain_values_become_messages(#[case] payload: Box<dyn Any + Send>, #[case] expected: &str) {
        let err = into_error(payload);
        assert!(err.is_message());
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn unknown_payloads_fall_back_to_debug() {
        struct Opaque;
        let err = into_error(Box::new(Opaque));
        assert!(err.to_string().contains("Any"));
    }

    #[test]
    fn errors_pass_through() {
        let err = into_error(Box::new(Error::new(Timeout)));
        assert!(err.downcast_ref::<Timeout>().is_some());

        let boxed: BoxError = Box::new(Timeout);
        let err = into_error(Box::new(boxed));
        assert!(!err.is_message());
        assert_eq!(err.to_string(), "upstream timed out");
    }

    #[test]
    fn unboxed_error_types_are_opaque() {
        let err = into_error(Box::new(Timeout));
        assert!(err.is_message());
        assert!(err.downcast_ref::<Timeout>().is_none());
        assert!(err.to_string().contains("Any"));

        let err = into_error(Box::new(Box::new(Timeout) as BoxError));
        assert!(err.downcast_ref::<Timeout>().is_some());
    }
}
