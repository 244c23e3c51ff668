pub mod generate;
pub mod listproviders;
