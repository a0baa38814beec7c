use crate::util::{api_request, print_response};

pub async fn run(api_url: &str) -> i32 {
    match api_request(api_url, reqwest::Method::GET, "/health", None).await {
        Ok((code, body)) => {
            print_response(code, &body);
            code
        }
        Err(code) => code,
    }
}
