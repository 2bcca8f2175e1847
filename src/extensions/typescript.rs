//! Keeps a project's `tsconfig.json` in step with its TypeScript sources.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use ignore::WalkBuilder;
use serde::Serialize;

use crate::core::event::{
    DeleteResourceEvent, LoadProjectEvent, RenameResourceEvent, SaveResourceEvent,
};
use crate::core::service::{Result as ServiceResult, ServiceError};
use crate::core::Service;
use crate::kernel::services::ports::{
    HostExtension, ProjectHook, ProjectService, ResourceHook, ResourceService,
};
use crate::kernel::services::ServiceLocator;

pub const TYPESCRIPT_EXTENSION_NAME: &str = "TypeScriptLanguageExtension";
pub const TSCONFIG_FILE: &str = "tsconfig.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    target: &'static str,
    module: &'static str,
    no_implicit_any: bool,
    remove_comments: bool,
    no_emit_on_error: bool,
    source_map: bool,
    allow_js: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            target: "es5",
            module: "commonjs",
            no_implicit_any: false,
            remove_comments: true,
            no_emit_on_error: true,
            source_map: false,
            allow_js: false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TsConfig<'a> {
    compiler_options: CompilerOptions,
    files: Vec<&'a str>,
}

#[derive(Debug)]
struct TsProject {
    root: PathBuf,
    files: BTreeSet<String>,
}

impl TsProject {
    fn scan(root: PathBuf) -> Self {
        let walker = WalkBuilder::new(&root)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .require_git(false)
            .build();

        let mut files = BTreeSet::new();
        for entry in walker.flatten() {
            let path = entry.path();
            if !path.is_file() || !is_typescript(path) {
                continue;
            }
            if let Some(rel) = relative_to(&root, path) {
                files.insert(rel);
            }
        }
        Self { root, files }
    }

    /// Maps an event path onto the project. Paths outside the root give `None`.
    fn resolve(&self, path: &str) -> Option<String> {
        let path = Path::new(path);
        if path.is_absolute() {
            relative_to(&self.root, path)
        } else {
            normalize(path)
        }
    }

    fn write_tsconfig(&self) -> ServiceResult<()> {
        let config = TsConfig {
            compiler_options: CompilerOptions::default(),
            files: self.files.iter().map(String::as_str).collect(),
        };
        let mut json = serde_json::to_string_pretty(&config)?;
        json.push('\n');
        std::fs::write(self.root.join(TSCONFIG_FILE), json)?;
        tracing::debug!(
            root = %self.root.display(),
            files = self.files.len(),
            "tsconfig.json written"
        );
        Ok(())
    }
}

/// Built-in language extension for TypeScript projects.
#[derive(Debug, Default)]
pub struct TypescriptLanguageExtension {
    project: RefCell<Option<TsProject>>,
}

impl TypescriptLanguageExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_root(&self) -> Option<PathBuf> {
        self.project.borrow().as_ref().map(|p| p.root.clone())
    }

    /// Root-relative TypeScript files of the loaded project, sorted.
    pub fn project_files(&self) -> Vec<String> {
        self.project
            .borrow()
            .as_ref()
            .map(|p| p.files.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Applies `change` and rewrites `tsconfig.json` if it reports a change.
    /// A failed write restores the previous file set, so the same event
    /// retries the write.
    fn update<F>(&self, change: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut TsProject) -> bool,
    {
        let mut project = self.project.borrow_mut();
        let Some(project) = project.as_mut() else {
            return Ok(());
        };
        let previous = project.files.clone();
        if !change(project) {
            return Ok(());
        }
        if let Err(e) = project.write_tsconfig() {
            project.files = previous;
            return Err(e);
        }
        Ok(())
    }
}

impl Service for TypescriptLanguageExtension {
    fn name(&self) -> &str {
        TYPESCRIPT_EXTENSION_NAME
    }
}

impl HostExtension for TypescriptLanguageExtension {
    fn initialize(self: Rc<Self>, locator: &ServiceLocator) -> ServiceResult<()> {
        locator.project_services().register(self.clone());
        locator.resource_services().register(self);
        Ok(())
    }
}

impl ProjectService for TypescriptLanguageExtension {
    fn project_hooks(&self) -> &'static [ProjectHook] {
        &[ProjectHook::ProjectLoaded, ProjectHook::ProjectUnloaded]
    }

    fn project_loaded(&self, ev: &LoadProjectEvent) -> ServiceResult<()> {
        let mut root = PathBuf::from(&ev.path);
        if root.is_file() {
            root = root
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
        }
        if !root.is_dir() {
            return Err(ServiceError::failed(format!(
                "project root {} is not a directory",
                root.display()
            )));
        }

        let project = TsProject::scan(root);
        tracing::info!(
            root = %project.root.display(),
            files = project.files.len(),
            "typescript project loaded"
        );
        // Drop any previous project first so a failed write leaves none loaded.
        let mut slot = self.project.borrow_mut();
        *slot = None;
        if !project.files.is_empty() {
            project.write_tsconfig()?;
        }
        *slot = Some(project);
        Ok(())
    }

    fn project_unloaded(&self) -> ServiceResult<()> {
        self.project.borrow_mut().take();
        Ok(())
    }
}

impl ResourceService for TypescriptLanguageExtension {
    fn resource_hooks(&self) -> &'static [ResourceHook] {
        &[ResourceHook::Save, ResourceHook::Delete, ResourceHook::Rename]
    }

    fn save(&self, ev: &SaveResourceEvent) -> ServiceResult<()> {
        if !is_typescript(Path::new(&ev.path)) {
            return Ok(());
        }
        self.update(|project| match project.resolve(&ev.path) {
            Some(rel) => project.files.insert(rel),
            None => false,
        })
    }

    fn delete(&self, ev: &DeleteResourceEvent) -> ServiceResult<()> {
        self.update(|project| match project.resolve(&ev.path) {
            Some(rel) => project.files.remove(&rel),
            None => false,
        })
    }

    fn rename(&self, ev: &RenameResourceEvent) -> ServiceResult<()> {
        self.update(|project| {
            let removed = project
                .resolve(&ev.path)
                .is_some_and(|rel| project.files.remove(&rel));
            let added = is_typescript(Path::new(&ev.new_path))
                && project
                    .resolve(&ev.new_path)
                    .is_some_and(|rel| project.files.insert(rel));
            removed || added
        })
    }
}

fn is_typescript(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "ts")
}

fn relative_to(root: &Path, path: &Path) -> Option<String> {
    normalize(path.strip_prefix(root).ok()?)
}

/// Joins plain components with `/`. Anything climbing out of the root is
/// rejected.
fn normalize(rel: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/extensions/typescript.rs"]
mod tests;
