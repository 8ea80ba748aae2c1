mod common;

mod endpoints;
mod http_transport;
mod interceptor;
mod search_filters;
