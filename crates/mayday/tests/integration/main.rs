//! End-to-end tests for the Mayday crash reporter
//!
//! Reports are written to a temporary directory in the crash monitor's
//! layout and delivered to a wiremock collector.


mod test_custom_handler;
mod test_send_reports;
