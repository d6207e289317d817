mod buffering;
mod conflicts;
