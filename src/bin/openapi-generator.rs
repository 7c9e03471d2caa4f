use utoipa::OpenApi;
use wavebeat_back::services::documentation::ApiDoc;

fn main() {
    let doc = ApiDoc::openapi();
    println!("{}", doc.to_pretty_json().unwrap());
}
