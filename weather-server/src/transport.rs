//! Transport front ends. Both decode inbound envelopes, feed the shared
//! dispatcher, and encode exactly one response per request.

pub mod http;
pub mod stdio;
