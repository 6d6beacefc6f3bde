/// Asserts that two `f64` expressions differ by less than `prec`. An optional trailing format
/// string and arguments are appended to the panic message, which helps when asserting inside a
/// loop over days.
#[macro_export]
macro_rules! assert_almost_eq {
    ($a:expr, $b:expr, $prec:expr $(,)?) => {
        if !$crate::numeric::almost_eq($a, $b, $prec) {
            panic!(
                "assertion failed: `abs(left - right) < {:e}`, (left: `{}`, right: `{}`)",
                $prec, $a, $b
            );
        }
    };
    ($a:expr, $b:expr, $prec:expr, $($context:tt)+) => {
        if !$crate::numeric::almost_eq($a, $b, $prec) {
            panic!(
                "assertion failed: `abs(left - right) < {:e}`, (left: `{}`, right: `{}`): {}",
                $prec,
                $a,
                $b,
                format_args!($($context)+)
            );
        }
    };
}
