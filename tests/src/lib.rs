//! End-to-end scans against local stub devices.

#[cfg(test)]
mod scan;
