//! Property tests: natively mapped nodes survive every editing format

mod properties;
