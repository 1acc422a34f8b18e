pub mod build;
pub mod types;
pub mod watch;

use hobbes::domain::value_objects::ConfigWarning;

pub(crate) fn print_warnings(warnings: &[ConfigWarning]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}
