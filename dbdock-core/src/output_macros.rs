//! Output macros for user-facing CLI messages.
//!
//! Diagnostics go through `tracing`; these macros are for the messages a user
//! asked for (connection URIs, instance tables, final errors).

#[macro_export]
macro_rules! dbk_print {
    ($($arg:tt)*) => {
        print!("{}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! dbk_println {
    () => {
        println!();
    };
    ($($arg:tt)*) => {
        println!("{}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! dbk_error {
    ($($arg:tt)*) => {
        eprintln!("{}", format!($($arg)*));
    }
}
