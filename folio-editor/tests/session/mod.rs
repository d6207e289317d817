//! Whole editing sessions: edits, switches and saves interleaved

mod saving;
mod switching;
