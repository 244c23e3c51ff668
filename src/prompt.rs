use crate::credential::ProviderFamily;
use crate::tools::generate::GenerationRequest;

/// Technology labels that mean the output is a web page or web app.
const WEB_TECHNOLOGIES: &[&str] = &[
    "html",
    "css",
    "javascript",
    "web",
    "react",
    "vue",
    "angular",
    "svelte",
    "next",
    "nuxt",
    "frontend",
    "tailwind",
    "bootstrap",
    "jquery",
];

const FEATURES_HEADING: &str = "The application must include the following features:";

/// System and user messages for one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBundle {
    pub system: String,
    pub user: String,
}

pub fn is_web_technology(technology: &str) -> bool {
    let t = technology.to_lowercase();
    WEB_TECHNOLOGIES.iter().any(|w| t.contains(w))
}

fn system_prompt(family: ProviderFamily) -> String {
    let base = "You are an expert software engineer who writes complete, production-ready \
                projects. You answer with source files, each in its own fenced code block.";
    match family {
        ProviderFamily::DeepSeek => base.to_string(),
        // Smaller hosted models drift into long explanations without this.
        ProviderFamily::HuggingFace => format!(
            "{base} Respond only with the files. Keep prose outside code blocks to a single short line per file."
        ),
    }
}

/// Compose the instruction text for a request. Pure; no I/O.
pub fn build_prompt(req: &GenerationRequest, family: ProviderFamily) -> PromptBundle {
    let technology = req.technology_or_default();
    let app_type = req.app_type_or_default();
    let features = req.features();

    let mut user = format!("Create a {technology} {app_type} based on the following description:\n\n");
    user.push_str(&req.prompt);
    user.push_str("\n\n");

    if !features.is_empty() {
        user.push_str(FEATURES_HEADING);
        user.push('\n');
        for feature in &features {
            user.push_str("- ");
            user.push_str(feature);
            user.push('\n');
        }
        user.push('\n');
    }

    user.push_str("Requirements for your answer:\n");
    user.push_str("1. Put each logical unit (component, module, stylesheet, config) in its own file.\n");
    user.push_str(
        "2. Immediately before every code block, write the file name on its own line \
         (for example `src/App.jsx`), and open the block with the language, e.g. ```jsx.\n",
    );
    user.push_str(
        "3. Write complete implementations. Do not leave placeholders, stubs or \"rest of code here\" comments.\n",
    );
    user.push_str("4. Include any configuration or dependency manifest the project needs to run.\n");

    if is_web_technology(technology) {
        user.push_str(
            "5. Every HTML file must be a valid, complete document with <!DOCTYPE html>, \
             <html>, <head> (charset, viewport and title) and <body>.\n",
        );
    }

    PromptBundle {
        system: system_prompt(family),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_detection_is_case_insensitive_substring() {
        assert!(is_web_technology("React"));
        assert!(is_web_technology("Vue.js"));
        assert!(is_web_technology("web development"));
        assert!(!is_web_technology("python"));
        assert!(!is_web_technology("rust"));
    }
}
