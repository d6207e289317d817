mod relay;
mod sessions;
