pub mod config;
pub mod judge;
pub mod provider;
pub mod util;

#[cfg(test)]
mod test;
