mod common;
mod enumerator;
