//! Screenshot-to-HTML prompt chain.
//!
//! describe → refine description → generate HTML → refine HTML
//! → write artifact → (optional) apply feedback → rewrite artifact
//!
//! Each turn embeds the previous turn's output in its prompt. There is no
//! retry and no partial result: the first error aborts the run before the
//! artifact is touched.

use crate::artifact;
use crate::capture::ImageRef;
use crate::error::Result;
use crate::llm::prompts;
use crate::llm::streaming::strip_code_fences;
use crate::llm::ChatModel;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    Describe,
    RefineDescription,
    GenerateHtml,
    RefineHtml,
    ApplyFeedback,
}

impl ChainStep {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ChainStep::Describe => "describe",
            ChainStep::RefineDescription => "refine_description",
            ChainStep::GenerateHtml => "generate_html",
            ChainStep::RefineHtml => "refine_html",
            ChainStep::ApplyFeedback => "apply_feedback",
        }
    }

    /// Status line shown while the step runs.
    pub fn status(&self) -> &'static str {
        match self {
            ChainStep::Describe => "Wait looking at your UI 🧑‍💻...",
            ChainStep::RefineDescription => "🔍 Refining description with visual comparison...",
            ChainStep::GenerateHtml => "Generating website 🛠️...",
            ChainStep::RefineHtml => "Refining website 🔧...",
            ChainStep::ApplyFeedback => "Applying user queries...",
        }
    }

    /// HTML steps have their replies fence-stripped and shown as code.
    pub fn produces_html(&self) -> bool {
        matches!(
            self,
            ChainStep::GenerateHtml | ChainStep::RefineHtml | ChainStep::ApplyFeedback
        )
    }
}

/// Progress callbacks for the front end. All methods default to no-ops.
pub trait ChainObserver {
    fn step_started(&mut self, _step: ChainStep) {}

    fn step_finished(&mut self, _step: ChainStep, _output: &str) {}

    fn artifact_written(&mut self, _path: &Path, _html: &str) {}

    /// Free-text feedback for the generated page, asked once after the
    /// artifact is written. `None` or blank skips the feedback turn.
    fn feedback(&mut self) -> Option<String> {
        None
    }
}

/// Observer that ignores everything.
pub struct SilentObserver;

impl ChainObserver for SilentObserver {}

/// Outputs of the four fixed turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutput {
    pub description: String,
    pub refined_description: String,
    pub initial_html: String,
    pub refined_html: String,
}

/// Holds one model session and issues the chain's turns in order.
pub struct PromptChain<M: ChatModel> {
    model: M,
    framework: String,
    turns: usize,
}

impl<M: ChatModel> PromptChain<M> {
    pub fn new(model: M, framework: impl Into<String>) -> Self {
        Self {
            model,
            framework: framework.into(),
            turns: 0,
        }
    }

    /// Turns issued so far, failed ones included.
    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    async fn turn(
        &mut self,
        step: ChainStep,
        prompt: &str,
        image: &ImageRef,
        observer: &mut dyn ChainObserver,
    ) -> Result<String> {
        observer.step_started(step);
        self.turns += 1;
        let start = std::time::Instant::now();

        let reply = self.model.send_turn(prompt, image).await?;
        let reply = if step.produces_html() {
            strip_code_fences(&reply)
        } else {
            reply
        };

        log::info!(
            "[PIPELINE] {} done in {}ms ({} chars)",
            step.name(),
            start.elapsed().as_millis(),
            reply.len()
        );
        observer.step_finished(step, &reply);
        Ok(reply)
    }

    /// Run the four fixed turns and return every intermediate output.
    pub async fn run(
        &mut self,
        image: &ImageRef,
        observer: &mut dyn ChainObserver,
    ) -> Result<ChainOutput> {
        let description = self
            .turn(ChainStep::Describe, prompts::DESCRIBE_PROMPT, image, observer)
            .await?;

        let prompt = prompts::build_refine_description_prompt(&description);
        let refined_description = self
            .turn(ChainStep::RefineDescription, &prompt, image, observer)
            .await?;

        let prompt = prompts::build_html_prompt(&refined_description, &self.framework);
        let initial_html = self
            .turn(ChainStep::GenerateHtml, &prompt, image, observer)
            .await?;

        let prompt = prompts::build_refine_html_prompt(&initial_html, &self.framework);
        let refined_html = self
            .turn(ChainStep::RefineHtml, &prompt, image, observer)
            .await?;

        Ok(ChainOutput {
            description,
            refined_description,
            initial_html,
            refined_html,
        })
    }

    /// Apply user feedback to `current_html` in one more turn.
    ///
    /// Blank feedback issues no turn and returns `None`.
    pub async fn apply_feedback(
        &mut self,
        feedback: &str,
        current_html: &str,
        image: &ImageRef,
        observer: &mut dyn ChainObserver,
    ) -> Result<Option<String>> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Ok(None);
        }
        let prompt = prompts::build_feedback_prompt(feedback, current_html);
        let updated = self
            .turn(ChainStep::ApplyFeedback, &prompt, image, observer)
            .await?;
        Ok(Some(updated))
    }
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub chain: ChainOutput,
    /// HTML currently in the artifact: the refined page, or the feedback
    /// revision when one was applied.
    pub final_html: String,
    pub artifact_path: PathBuf,
    pub feedback_applied: bool,
    pub turns: usize,
}

/// Full run: chain, artifact write, optional feedback turn.
///
/// The artifact is written only after the refined HTML exists, and
/// rewritten only if the feedback turn succeeds.
pub async fn code_ui<M: ChatModel>(
    chain: &mut PromptChain<M>,
    image: &ImageRef,
    output_path: &Path,
    observer: &mut dyn ChainObserver,
) -> Result<RunReport> {
    let pipeline_start = std::time::Instant::now();

    let output = chain.run(image, observer).await?;
    artifact::write_artifact(output_path, &output.refined_html)?;
    observer.artifact_written(output_path, &output.refined_html);

    let mut final_html = output.refined_html.clone();
    let mut feedback_applied = false;
    if let Some(feedback) = observer.feedback() {
        if let Some(updated) = chain
            .apply_feedback(&feedback, &output.refined_html, image, observer)
            .await?
        {
            artifact::write_artifact(output_path, &updated)?;
            observer.artifact_written(output_path, &updated);
            final_html = updated;
            feedback_applied = true;
        }
    }

    log::info!(
        "[PIPELINE] Total: {}ms over {} turns",
        pipeline_start.elapsed().as_millis(),
        chain.turns()
    );

    Ok(RunReport {
        chain: output,
        final_html,
        artifact_path: output_path.to_path_buf(),
        feedback_applied,
        turns: chain.turns(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_html_steps_produce_html() {
        assert!(!ChainStep::Describe.produces_html());
        assert!(!ChainStep::RefineDescription.produces_html());
        assert!(ChainStep::GenerateHtml.produces_html());
        assert!(ChainStep::RefineHtml.produces_html());
        assert!(ChainStep::ApplyFeedback.produces_html());
    }

    #[test]
    fn step_names_are_distinct() {
        let steps = [
            ChainStep::Describe,
            ChainStep::RefineDescription,
            ChainStep::GenerateHtml,
            ChainStep::RefineHtml,
            ChainStep::ApplyFeedback,
        ];
        let mut names: Vec<_> = steps.iter().map(|s| s.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), steps.len());
    }
}
