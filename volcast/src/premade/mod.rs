// Some prebuilt transfer functions for datasets used in development.
// With so many different datasets, a user will usually decode their own
// table from an image resource.

pub mod transfer_functions;
