mod common;
mod spire_verification;
