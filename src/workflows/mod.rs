pub mod honors;
