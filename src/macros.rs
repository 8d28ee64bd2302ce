/*
Change the definition of these macros to control the logging level statically
*/

macro_rules! log {
    ($logger:expr, $($arg:tt)*) => {{
        if !cfg!(feature = "no_logging") {
            if let Some(w) = $logger.line_writer() {
                let _ = writeln!(w, $($arg)*);
            }
        }
    }};
}

// Per-instruction trace of the VM, very noisy.
macro_rules! vmlog {
    ($logger:expr, $($arg:tt)*) => {{
        if cfg!(feature = "vm_logging") {
            log!($logger, $($arg)*);
        }
    }};
}
