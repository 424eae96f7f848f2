mod clip_complementarity;
mod decomposition_properties;
mod ffi_round_trip;
mod normalization_round_trip;
mod scenarios;
mod shapes;
