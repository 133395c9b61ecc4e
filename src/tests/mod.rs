//! Tests for the Netatmo API client.



#[cfg(test)]
mod resilience_tests;
