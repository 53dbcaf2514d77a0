//! Prompts for curriculum and image generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tightening the curriculum schema or the
//!    illustration style means editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect assembled prompts directly
//!    without calling a model, making prompt regressions easy to catch.

use crate::pipeline::split::RawModule;

/// System prompt for the curriculum completion.
pub const CURRICULUM_SYSTEM_PROMPT: &str = "You are a curriculum development expert. \
Always return valid JSON. The course_title is required and must not be blank. \
Each module must have a title, a highly detailed, realistic image prompt, and \
very detailed text content (350-400+ words).";

/// Instruction block sent as the user message, before the module list.
const CURRICULUM_INSTRUCTIONS: &str = r#"You will receive a list of course modules, each with a title and raw content. For the course:
- Generate a clear, descriptive, and engaging course title (do not leave blank).
- Generate a brief course description.
- Generate a highly detailed, realistic, and contextually accurate image prompt for the course cover image. The image prompt should visually represent the course topic, specifying key visual elements, educational context, and professional style. Ensure the image prompt is unique, descriptive, and suitable for high-quality, realistic educational illustrations.
For each module:
- Use the provided title as the module title (refine if needed).
- Generate a highly detailed, realistic, and contextually accurate image prompt for the module. The image prompt should visually represent the module's topic, specifying key visual elements, educational context, and professional style. Ensure each image prompt is unique, descriptive, and suitable for high-quality, realistic educational illustrations.
- Expand and elaborate on the module content, aiming for 350-400+ words per module. Include all relevant text, and add further explanation, examples, use cases, and key learning points to make the content comprehensive, engaging, and educational. Ensure all important concepts are covered and nothing essential is omitted.

Return a JSON with this structure:
{
    "course_title": "Course Name (required)",
    "course_description": "Brief course description",
    "course_cover_image_prompt": "Professional course cover image showing [specific visual elements related to the course topic] with realistic lighting, modern design, and educational appeal",
    "modules": [
        {
            "module_number": 1,
            "module_title": "Module Title",
            "module_image_prompt": "Highly detailed, realistic educational illustration showing [specific visual elements related to this module topic] with professional appearance, detailed graphics, and academic context",
            "module_content": "Very detailed text content for this module including key concepts, explanations, examples, use cases, and learning points"
        }
    ]
}

Here are the modules:
"#;

/// Assemble the user prompt: instructions followed by each raw module's
/// title and content, numbered 1-based in document order.
pub fn curriculum_user_prompt(modules: &[RawModule]) -> String {
    let mut prompt = String::from(CURRICULUM_INSTRUCTIONS);
    for (idx, m) in modules.iter().enumerate() {
        prompt.push_str(&format!(
            "\nModule {n} Title: {title}\nModule {n} Raw Content: {content}\n",
            n = idx + 1,
            title = m.title,
            content = m.content,
        ));
    }
    prompt
}

/// Wrap a caller-supplied image description in the fixed style requirements
/// for realistic educational illustrations.
pub fn image_prompt(text: &str) -> String {
    format!(
        r#"Create a highly realistic, professional educational illustration for: {text}

Style requirements:
- Photorealistic quality with high detail
- Professional educational content appearance
- Clean, modern design suitable for course materials
- Realistic lighting and shadows
- Professional color palette
- No cartoon or abstract elements
- Suitable for academic and professional learning environments
- High-resolution, crisp details"#
    )
}
