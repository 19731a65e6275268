//! Prompt templates for the screenshot-to-HTML chain.
//!
//! Each builder is a pure function of the fixed template, the CSS framework
//! hint, and the previous turn's output. Prior output is interpolated as-is,
//! with no escaping.

/// CSS approach used when none is given on the command line.
pub const DEFAULT_FRAMEWORK: &str = "Regular CSS use flex grid etc";

/// Step 1: describe the UI with bounding boxes and colors.
pub const DESCRIBE_PROMPT: &str = "Describe this UI in accurate details. When you reference a UI element put its name and bounding box in the format: [object name (y_min, x_min, y_max, x_max)]. Also Describe the color of the elements.";

/// Step 2: re-check the first description against the image.
pub fn build_refine_description_prompt(description: &str) -> String {
    format!(
        "Compare the described UI elements with the provided image and identify any missing elements or inaccuracies. \
         Also Describe the color of the elements. \
         Provide a refined and accurate description of the UI elements based on this comparison. \
         Here is the initial description: {description}"
    )
}

/// Step 3: turn the refined description into a single HTML file.
pub fn build_html_prompt(refined_description: &str, framework: &str) -> String {
    format!(
        "Create an HTML file based on the following UI description, using the UI elements described in the previous response. \
         Include {framework} CSS within the HTML file to style the elements. \
         Make sure the colors used are the same as the original UI. \
         The UI needs to be responsive and mobile-first, matching the original UI as closely as possible. \
         Do not include any explanations or comments. \
         Avoid using ```html. and ``` at the end. \
         ONLY return the HTML code with inline CSS. \
         Here is the refined description: {refined_description}"
    )
}

/// Step 4: validate and improve the generated HTML.
pub fn build_refine_html_prompt(initial_html: &str, framework: &str) -> String {
    format!(
        "Validate the following HTML code based on the UI description and image and provide a refined version of the HTML code with {framework} CSS \
         that improves accuracy, responsiveness, and adherence to the original design. \
         ONLY return the refined HTML code with inline CSS. \
         Avoid using ```html. and ``` at the end. \
         Here is the initial HTML: {initial_html}"
    )
}

/// Optional step 5: apply the user's free-text feedback to the refined HTML.
pub fn build_feedback_prompt(feedback: &str, current_html: &str) -> String {
    format!(
        "Apply the user's queries to the generated HTML code. \
         ONLY return the updated HTML code with inline CSS. \
         Avoid using ```html. and ``` at the end. \
         Here are the user's queries: {feedback} \
         Here is the current HTML: {current_html}"
    )
}
