/***************************************/
/*               Macros                */
/***************************************/

// Fatal startup errors: log and leave with status 1
#[macro_export]
macro_rules! unwrap_or_exit {
    ($expr:expr) => {
        $crate::unwrap_or_exit!($expr, "fatal error")
    };
    ($expr:expr, $context:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => {
                log::error!("{}: {}", $context, e);
                std::process::exit(1);
            }
        }
    };
}
