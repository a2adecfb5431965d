use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::Value;

use crate::core::errors::{IgnitionError, Result};
use crate::core::models::audit_entry::{AuditLogEntry, event};
use crate::core::models::common::{Actor, AuditStamp, Entity, EntityKind, Level};
use crate::core::models::configuration_item::{CiType, ConfigurationItem};
use crate::core::models::process_asset::{AssetType, ProcessAsset};
use crate::core::models::project_data::ProjectData;
use crate::core::models::requirement::{Priority, Requirement};
use crate::core::models::risk::Risk;
use crate::core::models::test_case::TestCase;
use crate::core::services::audit_trail::{AuditTrail, details};

/// Something a requirement can be linked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Test(String),
    Risk(String),
    Ci(String),
    Issue(u64),
}

impl LinkTarget {
    fn describe(&self) -> String {
        match self {
            LinkTarget::Test(id) => format!("test case {id}"),
            LinkTarget::Risk(id) => format!("risk {id}"),
            LinkTarget::Ci(id) => format!("configuration item {id}"),
            LinkTarget::Issue(n) => format!("issue #{n}"),
        }
    }
}

/// Graph-aware repository over one `ProjectData` document.
///
/// Every mutation stamps the touched entity, appends an audit entry, and
/// keeps the link map and CI dependency lists free of dangling ids.
pub struct ProjectService {
    project: ProjectData,
}

impl ProjectService {
    pub fn new(project: ProjectData) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &ProjectData {
        &self.project
    }

    /// Append an audit entry for an action that is not an entity mutation
    /// (push, pull, AI calls).
    pub fn record(
        &mut self,
        actor: Actor,
        event_type: &str,
        summary: impl Into<String>,
        details: BTreeMap<String, Value>,
    ) -> &AuditLogEntry {
        AuditTrail::record(
            &mut self.project.audit_log,
            actor,
            event_type,
            summary.into(),
            details,
        )
    }

    /// Insert a new entity. Its stamp is reset to `actor` at the current time.
    pub fn create<E: Entity>(&mut self, mut entity: E, actor: Actor) -> Result<String> {
        self.check_dependencies(entity.id(), entity.dependencies())?;
        if self.kind_of(entity.id()).is_some() {
            return Err(IgnitionError::InvalidInput {
                detail: format!("id {} is already in use", entity.id()),
            });
        }

        *entity.stamp_mut() = AuditStamp::created(actor, Utc::now());
        let id = entity.id().to_string();
        let summary = format!("Created {} '{}'", E::KIND, entity.label());
        E::collection_mut(&mut self.project).push(entity);

        self.record(
            actor,
            event::ENTITY_CREATED,
            summary,
            details([
                ("kind", Value::from(E::KIND.to_string())),
                ("id", Value::from(id.clone())),
            ]),
        );
        Ok(id)
    }

    pub fn get<E: Entity>(&self, id: &str) -> Result<&E> {
        E::collection(&self.project)
            .iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| not_found(E::KIND, id))
    }

    /// Apply `edit` to the entity with `id`. The edit is validated before it
    /// replaces the stored entity, so a rejected edit changes nothing.
    pub fn update<E: Entity>(
        &mut self,
        id: &str,
        actor: Actor,
        edit: impl FnOnce(&mut E),
    ) -> Result<()> {
        let mut updated = self.get::<E>(id)?.clone();
        edit(&mut updated);

        if updated.id() != id {
            return Err(IgnitionError::InvalidInput {
                detail: "an entity id cannot be changed".into(),
            });
        }
        self.check_dependencies(id, updated.dependencies())?;

        updated.stamp_mut().touch(actor, Utc::now());
        let summary = format!("Updated {} '{}'", E::KIND, updated.label());
        if let Some(slot) = E::collection_mut(&mut self.project)
            .iter_mut()
            .find(|e| e.id() == id)
        {
            *slot = updated;
        }

        self.record(
            actor,
            event::ENTITY_UPDATED,
            summary,
            details([
                ("kind", Value::from(E::KIND.to_string())),
                ("id", Value::from(id)),
            ]),
        );
        Ok(())
    }

    /// Instantiate a process asset and count the use.
    ///
    /// Returns the kind and id of the entity created from the template.
    pub fn apply_asset(&mut self, asset_id: &str, actor: Actor) -> Result<(EntityKind, String)> {
        let asset = self.get::<ProcessAsset>(asset_id)?.clone();

        let created = match asset.asset_type {
            AssetType::RequirementArchetype => {
                let req = Requirement::new(asset.content.clone(), Priority::Medium);
                (EntityKind::Requirement, self.create(req, actor)?)
            }
            AssetType::RiskPlaybook => {
                let description = if asset.description.is_empty() {
                    asset.name.clone()
                } else {
                    asset.description.clone()
                };
                let mut risk = Risk::new(description, Level::Medium, Level::Medium);
                risk.mitigation = Some(asset.content.clone());
                (EntityKind::Risk, self.create(risk, actor)?)
            }
            AssetType::TestStrategy => {
                let test = TestCase::new(asset.name.clone(), Some(asset.content.clone()));
                (EntityKind::TestCase, self.create(test, actor)?)
            }
            AssetType::SolutionBlueprint => {
                let mut ci = ConfigurationItem::new(asset.name.clone(), CiType::Software, "0.1.0");
                ci.quality_attributes = asset.tags.clone();
                (EntityKind::ConfigurationItem, self.create(ci, actor)?)
            }
        };

        let now = Utc::now();
        let mut usage_count = 0;
        if let Some(stored) = self
            .project
            .process_assets
            .iter_mut()
            .find(|a| a.id == asset.id)
        {
            stored.mark_used(now);
            stored.stamp.touch(actor, now);
            usage_count = stored.usage_count;
        }

        self.record(
            actor,
            event::ASSET_APPLIED,
            format!("Applied process asset '{}'", asset.name),
            details([
                ("assetId", Value::from(asset.id.clone())),
                ("createdKind", Value::from(created.0.to_string())),
                ("createdId", Value::from(created.1.clone())),
                ("usageCount", Value::from(usage_count)),
            ]),
        );
        Ok(created)
    }

    /// Link a requirement to a test, risk, configuration item or issue.
    ///
    /// Returns `false` when the link already existed.
    pub fn link(&mut self, requirement_id: &str, target: &LinkTarget, actor: Actor) -> Result<bool> {
        self.get::<Requirement>(requirement_id)?;
        let exists = match target {
            LinkTarget::Test(id) => self.contains::<TestCase>(id),
            LinkTarget::Risk(id) => self.contains::<Risk>(id),
            LinkTarget::Ci(id) => self.contains::<ConfigurationItem>(id),
            LinkTarget::Issue(_) => true,
        };
        if !exists {
            return Err(IgnitionError::InvalidLink {
                detail: format!("{} does not exist", target.describe()),
            });
        }

        let links = self
            .project
            .links
            .entry(requirement_id.to_string())
            .or_default();
        let added = match target {
            LinkTarget::Test(id) => push_unique(&mut links.tests, id.clone()),
            LinkTarget::Risk(id) => push_unique(&mut links.risks, id.clone()),
            LinkTarget::Ci(id) => push_unique(&mut links.cis, id.clone()),
            LinkTarget::Issue(n) => push_unique(&mut links.issues, *n),
        };

        if added {
            self.record(
                actor,
                event::LINK_ADDED,
                format!("Linked requirement {requirement_id} to {}", target.describe()),
                details([
                    ("requirementId", Value::from(requirement_id)),
                    ("target", Value::from(target.describe())),
                ]),
            );
        }
        Ok(added)
    }

    /// Remove a link. Returns `false` when there was nothing to remove.
    pub fn unlink(&mut self, requirement_id: &str, target: &LinkTarget, actor: Actor) -> Result<bool> {
        let Some(links) = self.project.links.get_mut(requirement_id) else {
            return Ok(false);
        };
        let before = links.tests.len() + links.risks.len() + links.cis.len() + links.issues.len();
        match target {
            LinkTarget::Test(id) => links.tests.retain(|t| t != id),
            LinkTarget::Risk(id) => links.risks.retain(|r| r != id),
            LinkTarget::Ci(id) => links.cis.retain(|c| c != id),
            LinkTarget::Issue(n) => links.issues.retain(|i| i != n),
        }
        let after = links.tests.len() + links.risks.len() + links.cis.len() + links.issues.len();
        if links.is_empty() {
            self.project.links.remove(requirement_id);
        }

        let removed = after < before;
        if removed {
            self.record(
                actor,
                event::LINK_REMOVED,
                format!("Unlinked requirement {requirement_id} from {}", target.describe()),
                details([
                    ("requirementId", Value::from(requirement_id)),
                    ("target", Value::from(target.describe())),
                ]),
            );
        }
        Ok(removed)
    }

    /// Delete any entity by id and sweep every reference to it.
    pub fn remove_entity(&mut self, id: &str, actor: Actor) -> Result<EntityKind> {
        let kind = self.kind_of(id).ok_or_else(|| IgnitionError::EntityNotFound {
            kind: "entity".into(),
            id: id.to_string(),
        })?;

        let label = self.label_of(kind, id);
        let swept = match kind {
            EntityKind::Requirement => {
                self.project.requirements.retain(|r| r.id != id);
                self.project
                    .links
                    .remove(id)
                    .map(|l| l.tests.len() + l.risks.len() + l.cis.len() + l.issues.len())
                    .unwrap_or(0)
            }
            EntityKind::TestCase => {
                self.project.test_cases.retain(|t| t.id != id);
                self.sweep_links(id)
            }
            EntityKind::Risk => {
                self.project.risks.retain(|r| r.id != id);
                self.sweep_links(id)
            }
            EntityKind::ConfigurationItem => {
                self.project.configuration_items.retain(|c| c.id != id);
                self.sweep_links(id) + self.sweep_dependencies(id, actor)
            }
            EntityKind::ProcessAsset => {
                self.project.process_assets.retain(|a| a.id != id);
                0
            }
        };

        self.record(
            actor,
            event::ENTITY_DELETED,
            format!("Deleted {kind} '{label}'"),
            details([
                ("kind", Value::from(kind.to_string())),
                ("id", Value::from(id)),
                ("sweptReferences", Value::from(swept)),
            ]),
        );
        Ok(kind)
    }

    /// Drop link entries and CI dependencies that name ids which no longer
    /// exist, as can happen in hand-edited or imported documents. Returns the
    /// number of references removed.
    pub fn prune_dangling(&mut self) -> usize {
        let project = &mut self.project;
        let known = |list: &[String], id: &str| list.iter().any(|x| x == id);
        let tests: Vec<String> = project.test_cases.iter().map(|t| t.id.clone()).collect();
        let risks: Vec<String> = project.risks.iter().map(|r| r.id.clone()).collect();
        let cis: Vec<String> = project
            .configuration_items
            .iter()
            .map(|c| c.id.clone())
            .collect();
        let requirements: Vec<String> = project.requirements.iter().map(|r| r.id.clone()).collect();

        let mut removed = 0;
        project.links.retain(|req, links| {
            if !known(&requirements, req) {
                removed += links.tests.len() + links.risks.len() + links.cis.len() + links.issues.len();
                return false;
            }
            let before = links.tests.len() + links.risks.len() + links.cis.len();
            links.tests.retain(|t| known(&tests, t));
            links.risks.retain(|r| known(&risks, r));
            links.cis.retain(|c| known(&cis, c));
            removed += before - (links.tests.len() + links.risks.len() + links.cis.len());
            !links.is_empty()
        });
        for ci in &mut project.configuration_items {
            let own = ci.id.clone();
            let before = ci.dependencies.len();
            ci.dependencies.retain(|d| *d != own && known(&cis, d));
            removed += before - ci.dependencies.len();
        }
        removed
    }

    /// Resolve a full id or unique id prefix across all entity kinds.
    pub fn resolve_id(&self, prefix: &str) -> Result<(EntityKind, String)> {
        let mut matches: Vec<(EntityKind, &str)> = Vec::new();
        collect_matches::<Requirement>(&self.project, prefix, &mut matches);
        collect_matches::<TestCase>(&self.project, prefix, &mut matches);
        collect_matches::<Risk>(&self.project, prefix, &mut matches);
        collect_matches::<ConfigurationItem>(&self.project, prefix, &mut matches);
        collect_matches::<ProcessAsset>(&self.project, prefix, &mut matches);
        pick_match(prefix, "entity", matches)
    }

    /// Resolve a full id or unique id prefix within one entity kind.
    pub fn resolve<E: Entity>(&self, prefix: &str) -> Result<String> {
        let mut matches = Vec::new();
        collect_matches::<E>(&self.project, prefix, &mut matches);
        pick_match(prefix, &E::KIND.to_string(), matches).map(|(_, id)| id)
    }

    fn contains<E: Entity>(&self, id: &str) -> bool {
        E::collection(&self.project).iter().any(|e| e.id() == id)
    }

    fn kind_of(&self, id: &str) -> Option<EntityKind> {
        if self.contains::<Requirement>(id) {
            Some(EntityKind::Requirement)
        } else if self.contains::<TestCase>(id) {
            Some(EntityKind::TestCase)
        } else if self.contains::<Risk>(id) {
            Some(EntityKind::Risk)
        } else if self.contains::<ConfigurationItem>(id) {
            Some(EntityKind::ConfigurationItem)
        } else if self.contains::<ProcessAsset>(id) {
            Some(EntityKind::ProcessAsset)
        } else {
            None
        }
    }

    fn label_of(&self, kind: EntityKind, id: &str) -> String {
        let label = match kind {
            EntityKind::Requirement => self.get::<Requirement>(id).map(|e| e.label().to_string()),
            EntityKind::TestCase => self.get::<TestCase>(id).map(|e| e.label().to_string()),
            EntityKind::Risk => self.get::<Risk>(id).map(|e| e.label().to_string()),
            EntityKind::ConfigurationItem => {
                self.get::<ConfigurationItem>(id).map(|e| e.label().to_string())
            }
            EntityKind::ProcessAsset => self.get::<ProcessAsset>(id).map(|e| e.label().to_string()),
        };
        label.unwrap_or_default()
    }

    /// Dependencies must name existing configuration items other than `own_id`.
    fn check_dependencies(&self, own_id: &str, dependencies: &[String]) -> Result<()> {
        for dep in dependencies {
            if dep == own_id {
                return Err(IgnitionError::InvalidLink {
                    detail: "a configuration item cannot depend on itself".into(),
                });
            }
            if !self.contains::<ConfigurationItem>(dep) {
                return Err(IgnitionError::InvalidLink {
                    detail: format!("dependency {dep} is not a configuration item"),
                });
            }
        }
        Ok(())
    }

    /// Drop `id` from every requirement's links; prune emptied entries.
    fn sweep_links(&mut self, id: &str) -> usize {
        let swept = self
            .project
            .links
            .values_mut()
            .map(|links| links.forget(id))
            .sum();
        self.project.links.retain(|_, links| !links.is_empty());
        swept
    }

    /// Drop `id` from other configuration items' dependency lists.
    fn sweep_dependencies(&mut self, id: &str, actor: Actor) -> usize {
        let now = Utc::now();
        let mut swept = 0;
        for ci in &mut self.project.configuration_items {
            let before = ci.dependencies.len();
            ci.dependencies.retain(|d| d != id);
            if ci.dependencies.len() < before {
                swept += before - ci.dependencies.len();
                ci.stamp.touch(actor, now);
            }
        }
        swept
    }
}

fn not_found(kind: EntityKind, id: &str) -> IgnitionError {
    IgnitionError::EntityNotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) -> bool {
    if list.contains(&item) {
        return false;
    }
    list.push(item);
    true
}

fn collect_matches<'a, E: Entity + 'a>(
    project: &'a ProjectData,
    prefix: &str,
    out: &mut Vec<(EntityKind, &'a str)>,
) {
    out.extend(
        E::collection(project)
            .iter()
            .filter(|e| e.id().starts_with(prefix))
            .map(|e| (E::KIND, e.id())),
    );
}

fn pick_match(prefix: &str, kind: &str, matches: Vec<(EntityKind, &str)>) -> Result<(EntityKind, String)> {
    if prefix.is_empty() {
        return Err(IgnitionError::InvalidInput {
            detail: "id must not be empty".into(),
        });
    }
    if let Some((k, id)) = matches.iter().find(|(_, id)| *id == prefix) {
        return Ok((*k, id.to_string()));
    }
    match matches.as_slice() {
        [] => Err(IgnitionError::EntityNotFound {
            kind: kind.to_string(),
            id: prefix.to_string(),
        }),
        [(k, id)] => Ok((*k, id.to_string())),
        _ => Err(IgnitionError::AmbiguousId {
            prefix: prefix.to_string(),
            count: matches.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::requirement::RequirementStatus;
    use crate::core::models::test_case::TestStatus;

    fn service() -> ProjectService {
        ProjectService::new(ProjectData::new("Apollo"))
    }

    fn with_id<E: Entity>(mut entity: E, id: &str) -> E
    where
        E: HasId,
    {
        entity.set_id(id);
        entity
    }

    trait HasId {
        fn set_id(&mut self, id: &str);
    }

    impl HasId for Requirement {
        fn set_id(&mut self, id: &str) {
            self.id = id.into();
        }
    }

    impl HasId for TestCase {
        fn set_id(&mut self, id: &str) {
            self.id = id.into();
        }
    }

    impl HasId for Risk {
        fn set_id(&mut self, id: &str) {
            self.id = id.into();
        }
    }

    impl HasId for ConfigurationItem {
        fn set_id(&mut self, id: &str) {
            self.id = id.into();
        }
    }

    #[test]
    fn create_grows_array_by_one_and_stamps_user() {
        let mut svc = service();
        let id = svc
            .create(Requirement::new("Test", Priority::High), Actor::User)
            .unwrap();

        let project = svc.project();
        assert_eq!(project.requirements.len(), 1);
        let req = &project.requirements[0];
        assert_eq!(req.id, id);
        assert_eq!(req.stamp.created_at, req.stamp.updated_at);
        assert_eq!(req.stamp.created_by, Actor::User);
        assert_eq!(req.stamp.updated_by, Actor::User);

        let entry = project.audit_log.last().unwrap();
        assert_eq!(entry.event_type, event::ENTITY_CREATED);
        assert_eq!(entry.actor, Actor::User);
        assert_eq!(entry.details["id"], id.as_str());
    }

    #[test]
    fn create_rejects_duplicate_id() {
        let mut svc = service();
        svc.create(with_id(Requirement::new("a", Priority::Low), "REQ-1"), Actor::User)
            .unwrap();
        let err = svc
            .create(with_id(TestCase::new("b", None), "REQ-1"), Actor::User)
            .unwrap_err();
        assert!(matches!(err, IgnitionError::InvalidInput { .. }));
        assert!(svc.project().test_cases.is_empty());
    }

    #[test]
    fn update_bumps_updated_stamp_only() {
        let mut svc = service();
        let id = svc
            .create(Requirement::new("Draft", Priority::Low), Actor::User)
            .unwrap();
        let created_at = svc.project().requirements[0].stamp.created_at;

        svc.update::<Requirement>(&id, Actor::Ai, |r| {
            r.status = RequirementStatus::Active;
            r.description = "Final".into();
        })
        .unwrap();

        let req = &svc.project().requirements[0];
        assert_eq!(req.description, "Final");
        assert_eq!(req.status, RequirementStatus::Active);
        assert_eq!(req.stamp.created_at, created_at);
        assert_eq!(req.stamp.created_by, Actor::User);
        assert_eq!(req.stamp.updated_by, Actor::Ai);
        assert!(req.stamp.updated_at >= created_at);
        assert_eq!(svc.project().audit_log.last().unwrap().event_type, event::ENTITY_UPDATED);
    }

    #[test]
    fn update_unknown_id_fails() {
        let mut svc = service();
        let err = svc
            .update::<TestCase>("missing", Actor::User, |t| t.status = TestStatus::Passed)
            .unwrap_err();
        assert!(matches!(err, IgnitionError::EntityNotFound { .. }));
    }

    #[test]
    fn rejected_update_leaves_entity_untouched() {
        let mut svc = service();
        let ci = svc
            .create(ConfigurationItem::new("api", CiType::Service, "1.0"), Actor::User)
            .unwrap();
        let err = svc
            .update::<ConfigurationItem>(&ci, Actor::User, |c| {
                c.version = "2.0".into();
                c.dependencies.push("ghost".into());
            })
            .unwrap_err();
        assert!(matches!(err, IgnitionError::InvalidLink { .. }));
        assert_eq!(svc.project().configuration_items[0].version, "1.0");
    }

    #[test]
    fn ci_cannot_depend_on_itself() {
        let mut svc = service();
        let ci = svc
            .create(ConfigurationItem::new("db", CiType::Database, "15"), Actor::User)
            .unwrap();
        let self_ref = ci.clone();
        let err = svc
            .update::<ConfigurationItem>(&ci, Actor::User, |c| c.dependencies.push(self_ref))
            .unwrap_err();
        assert!(matches!(err, IgnitionError::InvalidLink { .. }));
    }

    #[test]
    fn link_requires_existing_entities() {
        let mut svc = service();
        let req = svc
            .create(Requirement::new("r", Priority::Low), Actor::User)
            .unwrap();

        let err = svc
            .link(&req, &LinkTarget::Test("nope".into()), Actor::User)
            .unwrap_err();
        assert!(matches!(err, IgnitionError::InvalidLink { .. }));

        let err = svc
            .link("nope", &LinkTarget::Issue(3), Actor::User)
            .unwrap_err();
        assert!(matches!(err, IgnitionError::EntityNotFound { .. }));
    }

    #[test]
    fn link_is_idempotent() {
        let mut svc = service();
        let req = svc.create(Requirement::new("r", Priority::Low), Actor::User).unwrap();
        let test = svc.create(TestCase::new("t", None), Actor::User).unwrap();

        assert!(svc.link(&req, &LinkTarget::Test(test.clone()), Actor::User).unwrap());
        assert!(!svc.link(&req, &LinkTarget::Test(test.clone()), Actor::User).unwrap());
        assert_eq!(svc.project().links[&req].tests, vec![test]);
    }

    #[test]
    fn unlink_prunes_empty_entry() {
        let mut svc = service();
        let req = svc.create(Requirement::new("r", Priority::Low), Actor::User).unwrap();
        svc.link(&req, &LinkTarget::Issue(12), Actor::User).unwrap();

        assert!(svc.unlink(&req, &LinkTarget::Issue(12), Actor::User).unwrap());
        assert!(!svc.project().links.contains_key(&req));
        assert!(!svc.unlink(&req, &LinkTarget::Issue(12), Actor::User).unwrap());
    }

    #[test]
    fn deleting_test_sweeps_every_link_map() {
        let mut svc = service();
        let r1 = svc.create(Requirement::new("r1", Priority::Low), Actor::User).unwrap();
        let r2 = svc.create(Requirement::new("r2", Priority::Low), Actor::User).unwrap();
        let t1 = svc.create(TestCase::new("t1", None), Actor::User).unwrap();
        let t2 = svc.create(TestCase::new("t2", None), Actor::User).unwrap();
        svc.link(&r1, &LinkTarget::Test(t1.clone()), Actor::User).unwrap();
        svc.link(&r1, &LinkTarget::Test(t2.clone()), Actor::User).unwrap();
        svc.link(&r2, &LinkTarget::Test(t1.clone()), Actor::User).unwrap();

        assert_eq!(svc.remove_entity(&t1, Actor::User).unwrap(), EntityKind::TestCase);

        let project = svc.project();
        assert!(project.test_cases.iter().all(|t| t.id != t1));
        assert!(project.links.values().all(|l| !l.tests.contains(&t1)));
        assert_eq!(project.links[&r1].tests, vec![t2]);
        assert!(!project.links.contains_key(&r2));

        let entry = project.audit_log.last().unwrap();
        assert_eq!(entry.event_type, event::ENTITY_DELETED);
        assert_eq!(entry.details["sweptReferences"], 2);
    }

    #[test]
    fn deleting_risk_keeps_other_links() {
        let mut svc = service();
        let req = svc.create(Requirement::new("r", Priority::Low), Actor::User).unwrap();
        let risk = svc.create(Risk::new("x", Level::Low, Level::Low), Actor::User).unwrap();
        svc.link(&req, &LinkTarget::Risk(risk.clone()), Actor::User).unwrap();
        svc.link(&req, &LinkTarget::Issue(5), Actor::User).unwrap();

        svc.remove_entity(&risk, Actor::User).unwrap();

        let links = &svc.project().links[&req];
        assert!(links.risks.is_empty());
        assert_eq!(links.issues, vec![5]);
    }

    #[test]
    fn deleting_requirement_drops_its_links() {
        let mut svc = service();
        let req = svc.create(Requirement::new("r", Priority::Low), Actor::User).unwrap();
        let test = svc.create(TestCase::new("t", None), Actor::User).unwrap();
        svc.link(&req, &LinkTarget::Test(test.clone()), Actor::User).unwrap();

        svc.remove_entity(&req, Actor::User).unwrap();

        assert!(svc.project().requirements.is_empty());
        assert!(svc.project().links.is_empty());
        assert_eq!(svc.project().test_cases.len(), 1);
    }

    #[test]
    fn deleting_ci_sweeps_links_and_dependencies() {
        let mut svc = service();
        let req = svc.create(Requirement::new("r", Priority::Low), Actor::User).unwrap();
        let db = svc
            .create(ConfigurationItem::new("db", CiType::Database, "15"), Actor::User)
            .unwrap();
        let mut api = ConfigurationItem::new("api", CiType::Service, "1.0");
        api.dependencies.push(db.clone());
        let api = svc.create(api, Actor::User).unwrap();
        svc.link(&req, &LinkTarget::Ci(db.clone()), Actor::User).unwrap();

        svc.remove_entity(&db, Actor::Automation).unwrap();

        let project = svc.project();
        assert!(project.links.is_empty());
        let api = project.configuration_items.iter().find(|c| c.id == api).unwrap();
        assert!(api.dependencies.is_empty());
        assert_eq!(api.stamp.updated_by, Actor::Automation);
    }

    #[test]
    fn remove_unknown_id_fails() {
        let mut svc = service();
        assert!(matches!(
            svc.remove_entity("ghost", Actor::User),
            Err(IgnitionError::EntityNotFound { .. })
        ));
    }

    #[test]
    fn apply_asset_instantiates_and_counts_usage() {
        let mut svc = service();
        let mut playbook = ProcessAsset::new("Vendor lock-in", AssetType::RiskPlaybook, "Keep an exit plan");
        playbook.description = "Cloud vendor lock-in".into();
        let asset = svc.create(playbook, Actor::User).unwrap();

        let (kind, id) = svc.apply_asset(&asset, Actor::User).unwrap();
        assert_eq!(kind, EntityKind::Risk);
        let risk = svc.get::<Risk>(&id).unwrap();
        assert_eq!(risk.description, "Cloud vendor lock-in");
        assert_eq!(risk.mitigation.as_deref(), Some("Keep an exit plan"));

        svc.apply_asset(&asset, Actor::User).unwrap();
        let stored = svc.get::<ProcessAsset>(&asset).unwrap();
        assert_eq!(stored.usage_count, 2);
        assert!(stored.last_used_at.is_some());
        assert_eq!(svc.project().risks.len(), 2);
        assert_eq!(svc.project().audit_log.last().unwrap().event_type, event::ASSET_APPLIED);
    }

    #[test]
    fn test_strategy_becomes_gherkin_test() {
        let mut svc = service();
        let asset = svc
            .create(
                ProcessAsset::new("Login smoke", AssetType::TestStrategy, "Given a user\nThen login"),
                Actor::User,
            )
            .unwrap();
        let (kind, id) = svc.apply_asset(&asset, Actor::User).unwrap();
        assert_eq!(kind, EntityKind::TestCase);
        let test = svc.get::<TestCase>(&id).unwrap();
        assert_eq!(test.gherkin.as_deref(), Some("Given a user\nThen login"));
        assert_eq!(test.status, TestStatus::NotRun);
    }

    #[test]
    fn prune_dangling_drops_unknown_references() {
        let mut project = ProjectData::new("p");
        let req = Requirement::new("r", Priority::Low);
        let test = TestCase::new("t", None);
        let mut ci = ConfigurationItem::new("api", CiType::Service, "1");
        ci.dependencies = vec!["gone".into(), ci.id.clone()];
        project.links.insert(
            req.id.clone(),
            crate::core::models::project_data::RequirementLinks {
                tests: vec![test.id.clone(), "ghost".into()],
                issues: vec![3],
                ..Default::default()
            },
        );
        project.links.insert("orphan".into(), Default::default());
        project.requirements.push(req.clone());
        project.test_cases.push(test.clone());
        project.configuration_items.push(ci);

        let mut svc = ProjectService::new(project);
        assert_eq!(svc.prune_dangling(), 3);

        let project = svc.project();
        assert_eq!(project.links.len(), 1);
        assert_eq!(project.links[&req.id].tests, vec![test.id]);
        assert_eq!(project.links[&req.id].issues, vec![3]);
        assert!(project.configuration_items[0].dependencies.is_empty());
    }

    #[test]
    fn resolve_id_accepts_unique_prefix() {
        let mut svc = service();
        svc.create(with_id(Requirement::new("a", Priority::Low), "abc123"), Actor::User)
            .unwrap();
        svc.create(with_id(TestCase::new("b", None), "abd456"), Actor::User)
            .unwrap();
        svc.create(with_id(Risk::new("c", Level::Low, Level::Low), "abc"), Actor::User)
            .unwrap();

        assert_eq!(
            svc.resolve_id("abc1").unwrap(),
            (EntityKind::Requirement, "abc123".to_string())
        );
        assert_eq!(svc.resolve_id("abc").unwrap(), (EntityKind::Risk, "abc".to_string()));
        assert!(matches!(
            svc.resolve_id("ab"),
            Err(IgnitionError::AmbiguousId { count: 3, .. })
        ));
        assert!(matches!(
            svc.resolve_id("zzz"),
            Err(IgnitionError::EntityNotFound { .. })
        ));
        assert_eq!(svc.resolve::<TestCase>("ab").unwrap(), "abd456");
        assert!(svc.resolve::<ConfigurationItem>("ab").is_err());
    }
}
