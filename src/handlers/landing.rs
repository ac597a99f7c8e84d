use crate::app::App;
use crate::services::{AuthState, Route};
use super::Page;

pub fn serve_landing(app: &App) -> Page {
    app.navigator().push(Route::Landing);
    Page::Content(render_landing(&app.auth().state(), &app.config().upload.allowed_extensions))
}

pub fn render_landing(state: &AuthState, formats: &[String]) -> String {
    let mut page = String::new();
    page.push_str("meshport: point clouds in, meshes out\n\n");
    page.push_str("Upload a scanned point cloud and get back a reconstructed 3D mesh.\n");
    page.push_str("Conversions run in the cloud; follow their progress from the dashboard.\n\n");
    page.push_str(&format!("Supported formats: {}\n\n", formats.join(", ")));

    match state.user() {
        Some(user) => {
            page.push_str(&format!("Signed in as {}\n", user.email));
            page.push_str("  meshport dashboard        list your jobs\n");
            page.push_str("  meshport upload <file>    start a conversion\n");
        }
        None => {
            page.push_str("  meshport register --email <email>    create an account\n");
            page.push_str("  meshport login --email <email>       sign in\n");
        }
    }
    page
}
