pub mod get_pet;
