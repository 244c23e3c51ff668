//! Prompt builder output shape.

use appforge::credential::ProviderFamily;
use appforge::prompt::build_prompt;
use appforge::tools::generate::GenerationRequest;

#[test]
fn defaults_name_web_development_application() {
    let req = GenerationRequest::new("a todo app with local storage");
    let bundle = build_prompt(&req, ProviderFamily::DeepSeek);
    assert!(bundle.user.starts_with("Create a web development application"));
    assert!(bundle.user.contains("a todo app with local storage"));
    // Web default carries the HTML document directive.
    assert!(bundle.user.contains("<!DOCTYPE html>"));
}

#[test]
fn technology_and_type_open_the_prompt() {
    let req = GenerationRequest {
        technology: Some("python".to_string()),
        app_type: Some("CLI tool".to_string()),
        ..GenerationRequest::new("rename photos by date")
    };
    let bundle = build_prompt(&req, ProviderFamily::DeepSeek);
    assert!(bundle.user.starts_with("Create a python CLI tool"));
    assert!(!bundle.user.contains("<!DOCTYPE html>"));
}

#[test]
fn prompt_is_restated_verbatim() {
    let prompt = "  Build *exactly* this:\n- a list\n- a button  ";
    let req = GenerationRequest::new(prompt);
    let bundle = build_prompt(&req, ProviderFamily::HuggingFace);
    assert!(bundle.user.contains(prompt));
}

#[test]
fn features_render_as_bullets() {
    let req = GenerationRequest {
        features: Some(vec![
            "dark mode".to_string(),
            "  ".to_string(),
            "drag and drop".to_string(),
        ]),
        ..GenerationRequest::new("kanban board")
    };
    let bundle = build_prompt(&req, ProviderFamily::DeepSeek);
    assert!(bundle.user.contains("following features:\n- dark mode\n- drag and drop\n"));
}

#[test]
fn empty_features_omit_the_section() {
    let req = GenerationRequest {
        features: Some(vec![]),
        ..GenerationRequest::new("kanban board")
    };
    let bundle = build_prompt(&req, ProviderFamily::DeepSeek);
    assert!(!bundle.user.contains("following features"));
}

#[test]
fn directives_always_present() {
    let bundle = build_prompt(&GenerationRequest::new("x"), ProviderFamily::DeepSeek);
    assert!(bundle.user.contains("its own file"));
    assert!(bundle.user.contains("file name on its own line"));
    assert!(bundle.user.contains("complete implementations"));
}

#[test]
fn system_prompt_is_provider_tuned() {
    let req = GenerationRequest::new("x");
    let ds = build_prompt(&req, ProviderFamily::DeepSeek);
    let hf = build_prompt(&req, ProviderFamily::HuggingFace);
    assert_ne!(ds.system, hf.system);
    assert_eq!(ds.user, hf.user);
}

#[test]
fn request_defaults_and_validation() {
    let req: GenerationRequest = serde_json::from_value(serde_json::json!({
        "prompt": "a todo app",
        "technology": "react",
        "appType": "  ",
        "modelId": "deepseek-coder",
        "maxLength": 0
    }))
    .unwrap();
    assert_eq!(req.technology_or_default(), "react");
    assert_eq!(req.app_type_or_default(), "application");
    assert_eq!(req.model_override(), Some("deepseek-coder"));
    assert_eq!(req.max_tokens_or(4000), 4000);
    assert!(req.validate().is_ok());

    assert!(GenerationRequest::new("   \n").validate().is_err());
}
