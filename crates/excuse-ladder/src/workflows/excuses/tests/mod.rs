mod chain;
mod common;
