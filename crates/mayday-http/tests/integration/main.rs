//! Integration tests for mayday-http
//!
//! Uses wiremock to stand in for a collector and verifies the transport's
//! request shapes and status classification, and the report handler's
//! batch upload.


mod test_report_handler;
mod test_transport;
