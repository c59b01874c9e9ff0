//! Command orchestrator - the use cases behind every `micc` sub-command.
//!
//! Each command:
//! 1. checks its preconditions without touching the project,
//! 2. opens (or seeds) the project and attaches the project log,
//! 3. runs its primitives in order, stopping at the first failure.
//!
//! Files written before a failure are not rolled back; the error names what
//! was left undone.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Datelike;
use tracing::{debug, info, instrument, warn};

use crate::application::collaborators;
use crate::application::expander::{ExpansionReport, TemplateExpander};
use crate::application::paths;
use crate::application::ports::{
    Filesystem, LogSink, ManifestStore, ProcessRunner, Prompter, TemplateSource,
};
use crate::application::project::{MICC_JSON, NewProject, Project};
use crate::application::timing::Stopwatch;
use crate::application::ApplicationError;
use crate::domain::defaults::{self, DEFAULT_DESCRIPTION, PACKAGE_DOCS_TEMPLATE};
use crate::domain::structure::is_mirror_excluded;
use crate::domain::{
    Artifact, ArtifactKind, CollisionPolicy, DomainError, Parameters, Placement, Structure, bump,
    cli_app_name, parse_version, select_rule, text, verify_module_name, verify_project_name,
};
use crate::error::MiccResult;

/// Options shared by every command, fixed for one invocation.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub verbosity: u8,
    pub project_path: PathBuf,
    pub policy: CollisionPolicy,
    pub allow_nesting: bool,
    /// Template parameter overrides (user preferences and command options).
    pub parameters: Parameters,
    pub clear_log: bool,
}

impl GlobalOptions {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            verbosity: 1,
            project_path: project_path.into(),
            policy: CollisionPolicy::Skip,
            allow_nesting: false,
            parameters: Parameters::new(),
            clear_log: false,
        }
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }
}

// ── command arguments and outcomes ─────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub structure: Structure,
    /// User-selected templates; empty selects the defaults for `structure`.
    pub templates: Vec<String>,
    /// License name or a prefix of one.
    pub license: String,
    pub description: Option<String>,
    pub python_version: String,
    pub micc_file: Option<PathBuf>,
}

impl Default for CreateArgs {
    fn default() -> Self {
        Self {
            structure: Structure::Module,
            templates: Vec::new(),
            license: defaults::LICENSES[0].into(),
            description: None,
            python_version: defaults::DEFAULT_PYTHON_VERSION.into(),
            micc_file: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub path: PathBuf,
    pub name: String,
    pub package_name: String,
    pub structure: Structure,
    pub report: ExpansionReport,
}

#[derive(Debug, Clone)]
pub struct AddArgs {
    pub name: String,
    pub kind: ArtifactKind,
    /// Application with sub-commands.
    pub group: bool,
    pub templates: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub kind: ArtifactKind,
    pub name: String,
    /// Source file of the new artifact.
    pub source: PathBuf,
    pub report: ExpansionReport,
}

#[derive(Debug, Clone, Default)]
pub struct VersionArgs {
    pub rule: Option<String>,
    pub major: bool,
    pub minor: bool,
    pub patch: bool,
    pub tag: bool,
    pub dry_run: bool,
    /// Let `poetry version` update the packaging manifest.
    pub poetry: bool,
}

#[derive(Debug, Clone)]
pub enum VersionOutcome {
    Current {
        name: String,
        version: String,
    },
    Bumped {
        name: String,
        from: String,
        to: String,
        dry_run: bool,
        tag: Option<TagOutcome>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOutcome {
    pub tag: String,
    pub pushed: bool,
}

#[derive(Debug, Clone)]
pub enum ConvertOutcome {
    AlreadyPackage { name: String },
    Converted { name: String, report: ExpansionReport },
}

/// Everything `micc info` reports.
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub name: String,
    pub path: PathBuf,
    pub package_name: String,
    pub version: String,
    pub structure: Structure,
    pub source_file: PathBuf,
    pub artifacts: Vec<Artifact>,
    pub both_forms: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DevInstallArgs {
    /// Destination; asked from the Python interpreter when absent.
    pub site_packages: Option<PathBuf>,
    pub overwrite: bool,
}

#[derive(Debug, Clone)]
pub struct DevInstallOutcome {
    pub destination: PathBuf,
    /// Links created (install) or removed (uninstall).
    pub links: Vec<PathBuf>,
}

/// One symbolic link of a development install.
#[derive(Debug, Clone)]
struct MirrorLink {
    source: PathBuf,
    link: PathBuf,
}

#[derive(Debug, Clone, Default)]
struct MirrorPlan {
    dirs: Vec<PathBuf>,
    links: Vec<MirrorLink>,
}

// ── service ────────────────────────────────────────────────────────────────

/// Runs micc commands against the configured ports.
pub struct CommandService {
    fs: Arc<dyn Filesystem>,
    manifests: Arc<dyn ManifestStore>,
    templates: Arc<dyn TemplateSource>,
    runner: Arc<dyn ProcessRunner>,
    log: Arc<dyn LogSink>,
    prompter: Option<Arc<dyn Prompter>>,
}

impl CommandService {
    pub fn new(
        fs: Arc<dyn Filesystem>,
        manifests: Arc<dyn ManifestStore>,
        templates: Arc<dyn TemplateSource>,
        runner: Arc<dyn ProcessRunner>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            fs,
            manifests,
            templates,
            runner,
            log,
            prompter: None,
        }
    }

    /// Ask interactively for parameters without a value.
    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    fn expander(&self) -> TemplateExpander<'_> {
        TemplateExpander::new(self.fs.as_ref(), self.templates.as_ref(), self.runner.as_ref())
            .with_prompter(self.prompter.as_deref())
    }

    /// Locate and open the project, then attach its log.
    fn open(&self, options: &GlobalOptions, command: &str) -> MiccResult<Project> {
        let root = paths::find_project_root(self.fs.as_ref(), self.manifests.as_ref(), &options.project_path)?;
        let mut project = Project::open(Arc::clone(&self.fs), Arc::clone(&self.manifests), &root)?;
        project.attach_log(self.log.as_ref(), options.clear_log)?;
        info!("micc {command} in {}", project.path().display());
        Ok(project)
    }

    /// Parameters for templates applied to an existing project.
    fn project_parameters(&self, options: &GlobalOptions, project: &Project) -> Parameters {
        let mut params = options.parameters.clone();
        params.merge(project.overrides());
        params.insert("project_name", project.name());
        params.insert("package_name", project.package_name());
        params
    }

    // -------------------------------------------------------------------------
    // create
    // -------------------------------------------------------------------------

    /// Materialize a new project in an absent or empty directory.
    #[instrument(skip_all, fields(path = %options.project_path.display()))]
    pub fn create(&self, options: &GlobalOptions, args: &CreateArgs) -> MiccResult<CreateOutcome> {
        let seed = NewProject::prepare(
            self.fs.as_ref(),
            self.manifests.as_ref(),
            &options.project_path,
            options.allow_nesting,
        )?;

        let mut params = options.parameters.clone();
        if let Some(file) = &args.micc_file {
            params.merge(&Parameters::from_json(&self.fs.read_to_string(file)?)?);
        }

        let (structure, templates) = if args.templates.is_empty() {
            (args.structure, defaults::create_templates(args.structure))
        } else {
            (Structure::UserDefined, args.templates.clone())
        };

        params.insert("project_name", &seed.name);
        params.insert("package_name", &seed.package_name);
        params.insert(
            "project_short_description",
            args.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION),
        );
        params.insert("license", defaults::license_name(&args.license));
        params.insert("python_version", &args.python_version);
        params.insert("year", chrono::Local::now().year().to_string());

        self.fs.create_dir_all(&seed.path)?;
        let _log = self.log.attach(&seed.path, options.clear_log)?;
        info!("micc create in {}", seed.path.display());
        let _timer = Stopwatch::start("create");
        info!(
            "Creating project {} ({structure}, package {})",
            seed.name, seed.package_name
        );

        // The directory was empty, so only later templates of the chain can
        // collide with earlier ones.
        let report = self
            .expander()
            .expand(&templates, &params, &seed.path, CollisionPolicy::Overwrite)?;

        // The packaging manifest must load, or no later command finds the project.
        let pyproject = seed.path.join(paths::PYPROJECT);
        if self.manifests.exists(&pyproject) {
            self.manifests.open(&pyproject)?.get_str(&paths::NAME_KEY)?;
        }

        let micc_json = seed.path.join(MICC_JSON);
        self.fs.write(&micc_json, report.parameters.to_json().as_bytes())?;
        debug!("Wrote project template parameters to {}", micc_json.display());

        collaborators::git_init(
            self.runner.as_ref(),
            &seed.path,
            &seed.name,
            report.parameters.get("github_username"),
        );

        Ok(CreateOutcome {
            path: seed.path,
            name: seed.name,
            package_name: seed.package_name,
            structure,
            report,
        })
    }

    // -------------------------------------------------------------------------
    // add
    // -------------------------------------------------------------------------

    /// Add an application or a module to a package project.
    #[instrument(skip_all, fields(name = %args.name, kind = %args.kind))]
    pub fn add(&self, options: &GlobalOptions, args: &AddArgs) -> MiccResult<AddOutcome> {
        let mut project = self.open(options, "add")?;
        if project.structure() == Structure::Module {
            return Err(ApplicationError::ModuleStructureRefused {
                project: project.name().to_owned(),
            }
            .into());
        }

        let name = args.name.as_str();
        // Names are unique across all artifact kinds.
        if let Some(kind) = project.artifact_kind(name) {
            return Err(ApplicationError::ArtifactExists {
                project: project.name().to_owned(),
                kind,
                name: name.to_owned(),
            }
            .into());
        }
        let valid = match args.kind {
            ArtifactKind::Application => verify_project_name(name),
            _ => verify_module_name(name),
        };
        if !valid {
            return Err(DomainError::InvalidArtifactName {
                kind: args.kind.noun(),
                name: name.to_owned(),
            }
            .into());
        }

        let templates = if args.templates.is_empty() {
            vec![defaults::add_template(args.kind, args.group).to_owned()]
        } else {
            args.templates.clone()
        };

        let mut params = self.project_parameters(options, &project);
        match args.kind {
            ArtifactKind::Application => {
                params.insert("app_name", name);
                params.insert("cli_app_name", cli_app_name(name));
            }
            ArtifactKind::F2py | ArtifactKind::Cpp => {
                params.insert("module_name", name);
                if let Some(tools) = self.templates.cmake_tools() {
                    params.insert("path_to_cmake_tools", tools.to_string_lossy());
                }
            }
            ArtifactKind::PyModule | ArtifactKind::PyPackage => params.insert("module_name", name),
        }

        let _timer = Stopwatch::start("add");
        info!("Adding {} {name} to project {}", args.kind, project.name());
        let report = self
            .expander()
            .expand(&templates, &params, project.path(), options.policy)?;

        match args.kind {
            ArtifactKind::Application => self.register_app(&mut project, name)?,
            ArtifactKind::PyModule | ArtifactKind::PyPackage => {
                if args.kind == ArtifactKind::PyPackage {
                    project.promote_module(name)?;
                }
                self.document_module(&project, name)?;
            }
            ArtifactKind::F2py | ArtifactKind::Cpp => {
                let build = format!("^{}", crate::VERSION);
                project.add_dependencies(&[("et-micc-build", build.as_str())])?;
                self.document_extension(&project, args.kind, name)?;
            }
        }

        let source = project.package_dir().join(args.kind.source_path(name));
        info!("- source in {}", source.display());
        Ok(AddOutcome {
            kind: args.kind,
            name: name.to_owned(),
            source,
            report,
        })
    }

    /// Docs, scripts, dependencies and import of a new application.
    fn register_app(&self, project: &mut Project, app: &str) -> MiccResult<()> {
        let fs = self.fs.as_ref();
        let package = project.package_name().to_owned();
        let cli = cli_app_name(app);

        let index = project.path().join("docs").join("index.rst");
        if fs.is_file(&index) {
            if text::has_line_starting_with(&fs.read_to_string(&index)?, "   apps") {
                debug!("{} already lists apps", index.display());
            } else {
                paths::insert_in_file(fs, &index, &["   apps"], Placement::Before, "   api")?;
            }
        } else {
            warn!("{} not found; apps not added to the documentation index", index.display());
        }

        let apps_rst = project.path().join("APPS.rst");
        if !fs.exists(&apps_rst) {
            let title = "Command Line Interfaces (apps)";
            let rule = "*".repeat(title.len());
            fs.append(&apps_rst, &format!("{rule}\n{title}\n{rule}\n\n"))?;
        }
        fs.append(
            &apps_rst,
            &format!(".. click:: {package}.{cli}:main\n   :prog: {app}\n   :show-nested:\n\n"),
        )?;

        project.add_dependencies(&[("click", "^7.0")])?;
        project.set_script(app, &format!("{package}:{cli}.main"))?;

        paths::insert_in_file(
            fs,
            &project.source_file(),
            &[&format!("import {package}.{cli}")],
            Placement::Before,
            "__version__",
        )
    }

    fn document_module(&self, project: &Project, module: &str) -> MiccResult<()> {
        let package = project.package_name();
        self.fs.append(
            &project.path().join("API.rst"),
            &format!("\n.. automodule:: {package}.{module}\n   :members:\n\n"),
        )
    }

    fn document_extension(&self, project: &Project, kind: ArtifactKind, module: &str) -> MiccResult<()> {
        let package = project.package_name();
        let prefix = match kind {
            ArtifactKind::F2py => "f2py",
            _ => "cpp",
        };
        self.fs.append(
            &project.path().join("API.rst"),
            &format!("\n.. include:: ../{package}/{prefix}_{module}/{module}.rst\n"),
        )
    }

    // -------------------------------------------------------------------------
    // version / tag
    // -------------------------------------------------------------------------

    /// Show or bump the project version.
    #[instrument(skip_all)]
    pub fn version(&self, options: &GlobalOptions, args: &VersionArgs) -> MiccResult<VersionOutcome> {
        let rule = select_rule(args.rule.as_deref(), args.major, args.minor, args.patch)?;
        let mut project = self.open(options, "version")?;

        let Some(rule) = rule else {
            return Ok(VersionOutcome::Current {
                name: project.name().to_owned(),
                version: project.version().to_owned(),
            });
        };

        let from = project.version().to_owned();
        let current = parse_version(&from)?;
        let next = bump(&current, &rule);

        if args.dry_run {
            info!("({}) version {from} -> {next} (dry run)", project.name());
            return Ok(VersionOutcome::Bumped {
                name: project.name().to_owned(),
                from,
                to: next.to_string(),
                dry_run: true,
                tag: None,
            });
        }

        if args.poetry {
            collaborators::poetry_version(self.runner.as_ref(), project.path(), &rule.to_string())?;
            project.sync_source_version()?;
        } else {
            project.set_version(&next)?;
        }

        let tag = if args.tag {
            match self.tag_project(&project) {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    warn!("Version bumped but not tagged: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok(VersionOutcome::Bumped {
            name: project.name().to_owned(),
            from,
            to: project.version().to_owned(),
            dry_run: false,
            tag,
        })
    }

    /// Create and push the tag `v<version>`.
    #[instrument(skip_all)]
    pub fn tag(&self, options: &GlobalOptions) -> MiccResult<TagOutcome> {
        let project = self.open(options, "tag")?;
        self.tag_project(&project)
    }

    fn tag_project(&self, project: &Project) -> MiccResult<TagOutcome> {
        let tag = collaborators::tag_name(project.version());
        info!("Creating git tag {tag} for project {}", project.name());
        collaborators::git_tag(self.runner.as_ref(), project.path(), project.version())?;

        let pushed = match collaborators::git_push_tag(self.runner.as_ref(), project.path(), project.version()) {
            Ok(()) => true,
            Err(e) => {
                warn!("{e}. Rerun 'git push origin {tag}' later (you must be online).");
                false
            }
        };
        Ok(TagOutcome { tag, pushed })
    }

    // -------------------------------------------------------------------------
    // convert-to-package
    // -------------------------------------------------------------------------

    /// Turn a module project into a package project with full docs.
    #[instrument(skip_all)]
    pub fn convert_to_package(&self, options: &GlobalOptions) -> MiccResult<ConvertOutcome> {
        let mut project = self.open(options, "convert-to-package")?;
        if project.structure() != Structure::Module {
            warn!("Project {} is already a package", project.name());
            return Ok(ConvertOutcome::AlreadyPackage {
                name: project.name().to_owned(),
            });
        }

        info!("Converting Python module project {} to Python package project", project.name());
        let mut params = self.project_parameters(options, &project);
        params.insert("project_short_description", project.description());

        // A refused overlay must leave the module untouched.
        let report = self.expander().expand(
            &[PACKAGE_DOCS_TEMPLATE.to_owned()],
            &params,
            project.path(),
            options.policy,
        )?;
        project.promote_to_package()?;

        Ok(ConvertOutcome::Converted {
            name: project.name().to_owned(),
            report,
        })
    }

    // -------------------------------------------------------------------------
    // docs / info
    // -------------------------------------------------------------------------

    /// Build the documentation in every format, in order.
    #[instrument(skip_all)]
    pub fn docs(&self, options: &GlobalOptions, formats: &[String]) -> MiccResult<()> {
        let project = self.open(options, "docs")?;
        let docs_dir = project.path().join("docs");
        if !self.fs.is_dir(&docs_dir) {
            return Err(ApplicationError::Filesystem {
                path: docs_dir,
                reason: "documentation directory not found".into(),
            }
            .into());
        }

        let _timer = Stopwatch::start("docs");
        let mut first_failure = None;
        for format in formats {
            let code = collaborators::build_docs(self.runner.as_ref(), &docs_dir, format)?;
            if code != 0 && first_failure.is_none() {
                first_failure = Some((format.clone(), code));
            }
        }
        match first_failure {
            None => Ok(()),
            Some((format, code)) => Err(ApplicationError::CollaboratorFailed {
                command: format!("make {format}"),
                code,
            }
            .into()),
        }
    }

    /// Describe the project.
    pub fn info(&self, options: &GlobalOptions) -> MiccResult<ProjectInfo> {
        let project = self.open(options, "info")?;
        if project.has_both_forms() {
            warn!(
                "Project {} has both {} and {}",
                project.name(),
                paths::module_file(project.path(), project.package_name()).display(),
                paths::package_init(project.path(), project.package_name()).display(),
            );
        }
        Ok(ProjectInfo {
            name: project.name().to_owned(),
            path: project.path().to_path_buf(),
            package_name: project.package_name().to_owned(),
            version: project.version().to_owned(),
            structure: project.structure(),
            source_file: project.source_file(),
            artifacts: project.list_artifacts()?,
            both_forms: project.has_both_forms(),
        })
    }

    // -------------------------------------------------------------------------
    // dev-install / dev-uninstall
    // -------------------------------------------------------------------------

    /// Mirror the package into site-packages with file-level symbolic links.
    #[instrument(skip_all)]
    pub fn dev_install(&self, options: &GlobalOptions, args: &DevInstallArgs) -> MiccResult<DevInstallOutcome> {
        let project = self.open(options, "dev-install")?;
        let destination = self.site_packages(&project, args)?;
        let plan = self.mirror_plan(&project, &destination)?;
        let fs = self.fs.as_ref();

        let mut collisions: Vec<PathBuf> = plan
            .links
            .iter()
            .filter(|l| !fs.is_symlink(&l.link) && fs.exists(&l.link))
            .map(|l| l.link.clone())
            .collect();
        collisions.extend(
            plan.dirs
                .iter()
                .filter(|d| fs.is_symlink(d) || (fs.exists(d) && !fs.is_dir(d)))
                .cloned(),
        );
        if !collisions.is_empty() && !args.overwrite {
            return Err(ApplicationError::CollisionRefused { paths: collisions }.into());
        }

        info!("dev-install of {} into {}", project.package_name(), destination.display());
        for dir in &plan.dirs {
            if fs.is_symlink(dir) || (fs.exists(dir) && !fs.is_dir(dir)) {
                fs.remove_file(dir)?;
            }
            fs.create_dir_all(dir)?;
        }
        let mut links = Vec::with_capacity(plan.links.len());
        for MirrorLink { source, link } in plan.links {
            if fs.is_symlink(&link) || fs.is_file(&link) {
                fs.remove_file(&link)?;
            } else if fs.is_dir(&link) {
                fs.remove_dir_all(&link)?;
            }
            fs.symlink(&source, &link)?;
            debug!("Creating symlink {}", link.display());
            links.push(link);
        }
        Ok(DevInstallOutcome { destination, links })
    }

    /// Remove exactly the links a development install creates.
    #[instrument(skip_all)]
    pub fn dev_uninstall(&self, options: &GlobalOptions, args: &DevInstallArgs) -> MiccResult<DevInstallOutcome> {
        let project = self.open(options, "dev-uninstall")?;
        let destination = self.site_packages(&project, args)?;
        let plan = self.mirror_plan(&project, &destination)?;
        let fs = self.fs.as_ref();

        info!("dev-uninstall of {} from {}", project.package_name(), destination.display());
        let mut links = Vec::new();
        for MirrorLink { link, .. } in plan.links {
            if fs.is_symlink(&link) {
                fs.remove_file(&link)?;
                debug!("Removed symlink {}", link.display());
                links.push(link);
            } else if fs.exists(&link) {
                warn!("Leaving {} in place (not a link)", link.display());
            }
        }

        let mut dirs = plan.dirs;
        dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
        for dir in dirs {
            if fs.is_dir(&dir) && !fs.is_symlink(&dir) && fs.read_dir(&dir)?.is_empty() {
                fs.remove_dir(&dir)?;
            }
        }
        Ok(DevInstallOutcome { destination, links })
    }

    fn site_packages(&self, project: &Project, args: &DevInstallArgs) -> MiccResult<PathBuf> {
        match &args.site_packages {
            Some(dir) => Ok(dir.clone()),
            None => collaborators::site_packages(self.runner.as_ref(), project.path()).map(PathBuf::from),
        }
    }

    fn mirror_plan(&self, project: &Project, destination: &Path) -> MiccResult<MirrorPlan> {
        let mut plan = MirrorPlan::default();
        match project.structure() {
            Structure::Module => {
                let source = project.source_file();
                let Some(file_name) = source.file_name() else {
                    return Ok(plan);
                };
                plan.links.push(MirrorLink {
                    link: destination.join(file_name),
                    source,
                });
            }
            _ => {
                let package_dir = project.package_dir();
                let mirror = destination.join(project.package_name());
                self.collect_mirror(&package_dir, &mirror, &mut plan)?;
            }
        }
        Ok(plan)
    }

    fn collect_mirror(&self, source: &Path, mirror: &Path, plan: &mut MirrorPlan) -> MiccResult<()> {
        plan.dirs.push(mirror.to_path_buf());
        for entry in self.fs.read_dir(source)? {
            let name = entry.name().to_owned();
            if is_mirror_excluded(&name, entry.is_dir) {
                continue;
            }
            if entry.is_dir {
                self.collect_mirror(&entry.path, &mirror.join(&name), plan)?;
            } else {
                plan.links.push(MirrorLink {
                    source: entry.path,
                    link: mirror.join(&name),
                });
            }
        }
        Ok(())
    }
}
