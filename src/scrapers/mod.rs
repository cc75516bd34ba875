pub mod base;
pub mod b3;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod mock;
