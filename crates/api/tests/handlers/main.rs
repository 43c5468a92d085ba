mod middleware_test;
mod rota_test;
mod test_utils;
mod week_test;
