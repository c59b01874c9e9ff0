//! Template expansion: render a chain of templates into a target directory
//! under a collision policy.
//!
//! Templates are applied left to right. Parameters resolved for one template
//! flow into the next, and every template sees the files its predecessors
//! wrote. The whole chain is planned before anything is written: parameters
//! are resolved, every template is rendered and every merge decision is
//! taken against the target as the earlier templates will leave it. A chain
//! refused under the `skip` policy, or one with an unresolved parameter,
//! leaves the target untouched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, ProcessRunner, Prompter, TemplateSource};
use crate::domain::collision::backup_name;
use crate::domain::{CollisionPolicy, DomainError, MergeDecision, ParameterSpec, Parameters, decide, resolve};
use crate::error::MiccResult;

/// What an expansion did, file by file.
#[derive(Debug, Clone, Default)]
pub struct ExpansionReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub backed_up: Vec<PathBuf>,
    /// Every parameter in effect after the last template.
    pub parameters: Parameters,
}

/// One rendered template with its merge decisions.
struct TemplatePlan {
    name: String,
    files: Vec<(PathBuf, Vec<u8>, MergeDecision)>,
    hook: Option<String>,
}

/// Applies templates through the filesystem, template and process ports.
pub struct TemplateExpander<'a> {
    fs: &'a dyn Filesystem,
    templates: &'a dyn TemplateSource,
    runner: &'a dyn ProcessRunner,
    prompter: Option<&'a dyn Prompter>,
}

impl<'a> TemplateExpander<'a> {
    pub fn new(fs: &'a dyn Filesystem, templates: &'a dyn TemplateSource, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            fs,
            templates,
            runner,
            prompter: None,
        }
    }

    /// Ask for parameters that have neither an override nor a default.
    pub fn with_prompter(mut self, prompter: Option<&'a dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    /// Expand `templates` into `target`.
    #[instrument(skip_all, fields(target = %target.display(), policy = %policy))]
    pub fn expand(
        &self,
        templates: &[String],
        overrides: &Parameters,
        target: &Path,
        policy: CollisionPolicy,
    ) -> MiccResult<ExpansionReport> {
        let mut parameters = overrides.clone();
        // Contents the planned templates will leave behind.
        let mut staged: HashMap<PathBuf, Vec<u8>> = HashMap::new();
        let mut refused = Vec::new();
        let mut plans = Vec::with_capacity(templates.len());
        for reference in templates {
            plans.push(self.plan(reference, target, policy, &mut parameters, &mut staged, &mut refused)?);
        }

        if !refused.is_empty() {
            warn!("Pre-existing files that would be overwritten:");
            for path in &refused {
                warn!("  {}", path.display());
            }
            return Err(ApplicationError::CollisionRefused { paths: refused }.into());
        }

        let mut report = ExpansionReport {
            parameters,
            ..Default::default()
        };
        for plan in plans {
            self.apply(plan, target, &mut report)?;
        }
        Ok(report)
    }

    fn plan(
        &self,
        reference: &str,
        target: &Path,
        policy: CollisionPolicy,
        parameters: &mut Parameters,
        staged: &mut HashMap<PathBuf, Vec<u8>>,
        refused: &mut Vec<PathBuf>,
    ) -> MiccResult<TemplatePlan> {
        let template = self.templates.load(reference)?;
        debug!("Planning template {} ({})", template.name, template.root.display());

        let params = self.resolve(&template.parameters, parameters)?;
        let rendered = self.templates.render(&template, &params)?;
        let hook = self.templates.render_hook(&template, &params)?;

        let mut files = Vec::with_capacity(rendered.len());
        for file in rendered {
            let dest = target.join(&file.path);
            let existing = match staged.get(&dest) {
                Some(contents) => Some(contents.clone()),
                None if self.fs.is_file(&dest) => Some(self.fs.read(&dest)?),
                None => None,
            };
            let decision = decide(existing.as_deref(), &file.contents, policy);
            match decision {
                MergeDecision::Refuse => refused.push(dest.clone()),
                MergeDecision::Write | MergeDecision::BackupThenWrite => {
                    staged.insert(dest.clone(), file.contents.clone());
                }
                MergeDecision::SkipEqual => {}
            }
            files.push((dest, file.contents, decision));
        }

        *parameters = params;
        Ok(TemplatePlan {
            name: template.name,
            files,
            hook,
        })
    }

    fn apply(&self, plan: TemplatePlan, target: &Path, report: &mut ExpansionReport) -> MiccResult<()> {
        for (dest, contents, decision) in plan.files {
            match decision {
                MergeDecision::SkipEqual => report.unchanged.push(dest),
                MergeDecision::BackupThenWrite => {
                    let backup = backup_path(&dest);
                    self.fs.copy(&dest, &backup)?;
                    warn!("{} -> {}", dest.display(), backup.display());
                    self.fs.write(&dest, &contents)?;
                    report.backed_up.push(dest.clone());
                    report.written.push(dest);
                }
                MergeDecision::Write => {
                    if self.fs.exists(&dest) {
                        warn!("overwriting {}", dest.display());
                    }
                    self.fs.write(&dest, &contents)?;
                    report.written.push(dest);
                }
                // a refused file aborts the chain before anything is applied
                MergeDecision::Refuse => {}
            }
        }

        if let Some(script) = &plan.hook {
            self.run_hook(&plan.name, script, target)?;
        }
        info!("Expanded template {}", plan.name);
        Ok(())
    }

    fn resolve(&self, specs: &[ParameterSpec], overrides: &Parameters) -> MiccResult<Parameters> {
        let ask = self.prompter.map(|prompter| {
            move |spec: &ParameterSpec| {
                prompter.ask(spec).map_err(|e| {
                    warn!("No value for '{}': {e}", spec.name);
                    DomainError::UnresolvedParameter {
                        name: spec.name.clone(),
                    }
                })
            }
        });
        Ok(resolve(specs, overrides, ask)?)
    }

    fn run_hook(&self, template: &str, script: &str, target: &Path) -> MiccResult<()> {
        debug!("Running post-generation hook of {template}");
        let args = ["-c".to_owned(), script.to_owned()];
        let output = self.runner.run("sh", &args, target)?;
        if !output.stdout.is_empty() {
            debug!(" (stdout)\n{}", output.stdout);
        }
        if !output.stderr.is_empty() {
            debug!(" (stderr)\n{}", output.stderr);
        }
        if output.success() {
            Ok(())
        } else {
            Err(ApplicationError::HookFailed {
                template: template.to_owned(),
                code: output.code,
            }
            .into())
        }
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(backup_name(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_sits_next_to_original() {
        assert_eq!(
            backup_path(Path::new("/p/docs/index.rst")),
            PathBuf::from("/p/docs/index.rst.bak")
        );
    }
}
