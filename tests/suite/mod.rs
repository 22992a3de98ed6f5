mod activation;
mod messaging;
mod persistence;
