//! HTML import and export, including editor-style loose markup

mod export;
mod import;
