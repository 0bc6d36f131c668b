//! Record enhancer.
//!
//! Turns a raw record into an [`EnhancedRecord`]: the caller's action set,
//! the record redacted to the parts the caller may read, the record-part
//! permissions behind those decisions, and a read flag on every link.

use super::cache::InvocationCache;
use crate::catalog::{TypeDescriptor, TypeProvider};
use crate::config::EnhancerConfig;
use crate::error::{Error, Result};
use crate::redact::Redactor;
use crate::security::{Authorizer, Caller};
use crate::storage::RecordStorage;
use crate::terms::TermCollector;
use recordgate_proto::{
    Action, ActionSet, CollectedTerms, DataChild, DataGroup, EnhancedRecord, PermissionSet,
};
use tracing::{debug, instrument, trace};

/// How a denied READ is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadAccess {
    /// Denied READ aborts the call.
    Enforce,
    /// Denied READ only leaves READ out of the action set.
    Ignore,
}

/// Derives actions, permissions and link visibility for single records.
///
/// The enhancer is stateless between calls: each call builds its own
/// [`InvocationCache`], so one enhancer may serve concurrent requests.
pub struct RecordEnhancer<'a> {
    types: &'a dyn TypeProvider,
    authorizer: &'a dyn Authorizer,
    term_collector: &'a dyn TermCollector,
    storage: &'a dyn RecordStorage,
    config: EnhancerConfig,
}

/// Inputs shared by the per-action checks of one call.
struct Subject<'r> {
    record_type: &'r str,
    id: &'r str,
    record: &'r DataGroup,
    descriptor: &'r dyn TypeDescriptor,
    terms: &'r CollectedTerms,
}

impl<'a> RecordEnhancer<'a> {
    /// Create an enhancer over the given collaborators.
    pub fn new(
        types: &'a dyn TypeProvider,
        authorizer: &'a dyn Authorizer,
        term_collector: &'a dyn TermCollector,
        storage: &'a dyn RecordStorage,
    ) -> Self {
        Self {
            types,
            authorizer,
            term_collector,
            storage,
            config: EnhancerConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: EnhancerConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    pub(crate) fn types(&self) -> &dyn TypeProvider {
        self.types
    }

    pub(crate) fn storage(&self) -> &dyn RecordStorage {
        self.storage
    }

    /// Enhance a record the caller must be allowed to read.
    ///
    /// Fails with `AuthorizationDenied` when READ is denied; no redaction or
    /// further checks happen in that case.
    #[instrument(skip_all, fields(record_type = %record_type, caller = %caller.id))]
    pub fn enhance(
        &self,
        caller: &Caller,
        record_type: &str,
        record: &DataGroup,
        redactor: &dyn Redactor,
    ) -> Result<EnhancedRecord> {
        self.enhance_with(caller, record_type, record, redactor, ReadAccess::Enforce)
    }

    /// Enhance a record the caller just created or updated.
    ///
    /// The record is always returned, redacted, but READ is only in the
    /// action set if the caller may read it.
    #[instrument(skip_all, fields(record_type = %record_type, caller = %caller.id))]
    pub fn enhance_ignoring_read_access(
        &self,
        caller: &Caller,
        record_type: &str,
        record: &DataGroup,
        redactor: &dyn Redactor,
    ) -> Result<EnhancedRecord> {
        self.enhance_with(caller, record_type, record, redactor, ReadAccess::Ignore)
    }

    /// Enhance a list of records, leaving out those the caller may not read.
    ///
    /// Every record gets its own cache. Errors other than a READ denial
    /// abort the whole list.
    pub fn enhance_list(
        &self,
        caller: &Caller,
        record_type: &str,
        records: &[DataGroup],
        redactor: &dyn Redactor,
    ) -> Result<Vec<EnhancedRecord>> {
        let mut enhanced = Vec::with_capacity(records.len());
        for record in records {
            match self.enhance(caller, record_type, record, redactor) {
                Ok(e) => enhanced.push(e),
                Err(e) if e.is_authorization_denied() => {
                    trace!(id = ?record.record_id(), "record left out of list");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(enhanced)
    }

    fn enhance_with(
        &self,
        caller: &Caller,
        record_type: &str,
        record: &DataGroup,
        redactor: &dyn Redactor,
        access: ReadAccess,
    ) -> Result<EnhancedRecord> {
        let mut cache = InvocationCache::new();
        let descriptor = cache.descriptor(self.types, record_type)?;
        let id = record
            .record_id()
            .ok_or_else(|| Error::InvalidData(format!("{} record has no recordInfo id", record_type)))?;
        let terms = self.term_collector.collect(descriptor.definition_id(), record)?;

        let subject = Subject {
            record_type,
            id,
            record,
            descriptor: descriptor.as_ref(),
            terms: &terms,
        };

        let mut actions = ActionSet::new();
        let read_permissions = match self.read_permissions(caller, &subject) {
            Ok(permissions) => {
                actions.insert(Action::Read);
                permissions
            }
            Err(e) if e.is_authorization_denied() && access == ReadAccess::Ignore => {
                debug!(id, "read denied, returning record without READ");
                PermissionSet::new()
            }
            Err(e) => return Err(e),
        };

        let mut redacted = if descriptor.has_read_constraints() {
            redactor.remove_unpermitted_fields(
                descriptor.definition_id(),
                record,
                descriptor.read_constraints(),
                &read_permissions,
            )?
        } else {
            record.clone()
        };

        let write_permissions = self.add_update_action(caller, &subject, &mut actions)?;
        self.add_delete_or_incoming_links_action(caller, &subject, &mut actions)?;
        self.add_index_action(caller, &subject, &mut actions);
        self.add_search_action(caller, &subject, &mut actions, &mut cache)?;
        self.add_record_type_actions(caller, &subject, &mut actions);
        self.add_upload_action(caller, &subject, &mut actions);

        let read_allowed = actions.contains(Action::Read);
        self.resolve_links(caller, &mut redacted, read_allowed, &mut cache)?;

        debug!(id, actions = actions.len(), "record enhanced");
        Ok(EnhancedRecord {
            record: redacted,
            actions,
            read_permissions,
            write_permissions,
        })
    }

    fn read_permissions(&self, caller: &Caller, subject: &Subject<'_>) -> Result<PermissionSet> {
        if subject.descriptor.is_public_for_read() {
            return Ok(PermissionSet::new());
        }
        self.authorizer.check_record_part_permissions(
            caller,
            Action::Read,
            subject.record_type,
            &subject.terms.permission_terms,
            subject.descriptor.has_read_constraints(),
        )
    }

    fn add_update_action(
        &self,
        caller: &Caller,
        subject: &Subject<'_>,
        actions: &mut ActionSet,
    ) -> Result<PermissionSet> {
        match self.authorizer.check_record_part_permissions(
            caller,
            Action::Update,
            subject.record_type,
            &subject.terms.permission_terms,
            subject.descriptor.has_update_write_constraints(),
        ) {
            Ok(permissions) => {
                actions.insert(Action::Update);
                Ok(permissions)
            }
            Err(e) if e.is_authorization_denied() => {
                trace!(id = subject.id, "update denied");
                Ok(PermissionSet::new())
            }
            Err(e) => Err(e),
        }
    }

    fn add_delete_or_incoming_links_action(
        &self,
        caller: &Caller,
        subject: &Subject<'_>,
        actions: &mut ActionSet,
    ) -> Result<()> {
        if self.incoming_links_exist(subject)? {
            actions.insert(Action::ReadIncomingLinks);
        } else if self.authorizer.is_authorized_for_type_and_terms(
            caller,
            Action::Delete,
            subject.record_type,
            &subject.terms.permission_terms,
        ) {
            actions.insert(Action::Delete);
        }
        Ok(())
    }

    fn incoming_links_exist(&self, subject: &Subject<'_>) -> Result<bool> {
        if self
            .storage
            .links_exist_for_record(subject.descriptor.id(), subject.id)?
        {
            return Ok(true);
        }
        match subject.descriptor.parent_id() {
            Some(parent) => self.storage.links_exist_for_record(parent, subject.id),
            None => Ok(false),
        }
    }

    fn add_index_action(&self, caller: &Caller, subject: &Subject<'_>, actions: &mut ActionSet) {
        if subject
            .descriptor
            .represents_the_record_type_defining_record_types()
        {
            if self
                .authorizer
                .is_authorized_for_type(caller, Action::BatchIndex, subject.id)
            {
                actions.insert(Action::BatchIndex);
            }
        } else if self.authorizer.is_authorized_for_type_and_terms(
            caller,
            Action::Index,
            subject.record_type,
            &subject.terms.permission_terms,
        ) {
            actions.insert(Action::Index);
        }
    }

    fn add_search_action(
        &self,
        caller: &Caller,
        subject: &Subject<'_>,
        actions: &mut ActionSet,
        cache: &mut InvocationCache,
    ) -> Result<()> {
        if subject
            .descriptor
            .represents_the_record_type_defining_searches()
            && self.may_search_any(caller, subject.record)
        {
            actions.insert(Action::Search);
            return Ok(());
        }

        if !subject
            .descriptor
            .represents_the_record_type_defining_record_types()
        {
            return Ok(());
        }
        let described = match cache.descriptor(self.types, subject.id) {
            Ok(described) => described,
            Err(Error::UnknownRecordType(_)) => {
                trace!(id = subject.id, "described type not registered, no linked search");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let Some(search_id) = described.search_id() else {
            return Ok(());
        };
        let search = cache.search(search_id, || self.read_search(search_id))?;
        if let Some(search) = search {
            if self.may_search_any(caller, &search) {
                actions.insert(Action::Search);
            }
        }
        Ok(())
    }

    fn read_search(&self, search_id: &str) -> Result<Option<DataGroup>> {
        match self
            .storage
            .read(&[self.config.search_type.clone()], search_id)
        {
            Ok(search) => Ok(Some(search)),
            Err(e) if e.is_not_found() => {
                debug!(search_id, "linked search not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn may_search_any(&self, caller: &Caller, search: &DataGroup) -> bool {
        search
            .links_named(&self.config.search_target_link)
            .any(|target| {
                self.authorizer
                    .is_authorized_for_type(caller, Action::Search, &target.linked_record_id)
            })
    }

    fn add_record_type_actions(&self, caller: &Caller, subject: &Subject<'_>, actions: &mut ActionSet) {
        if !subject
            .descriptor
            .represents_the_record_type_defining_record_types()
        {
            return;
        }
        for action in [Action::Create, Action::List, Action::Validate] {
            if self.authorizer.is_authorized_for_type(caller, action, subject.id) {
                actions.insert(action);
            }
        }
    }

    fn add_upload_action(&self, caller: &Caller, subject: &Subject<'_>, actions: &mut ActionSet) {
        let is_binary = subject.descriptor.parent_id() == Some(self.config.binary_type.as_str());
        if is_binary
            && self.authorizer.is_authorized_for_type_and_terms(
                caller,
                Action::Upload,
                subject.record_type,
                &subject.terms.permission_terms,
            )
        {
            actions.insert(Action::Upload);
        }
    }

    fn resolve_links(
        &self,
        caller: &Caller,
        group: &mut DataGroup,
        read_allowed: bool,
        cache: &mut InvocationCache,
    ) -> Result<()> {
        for child in group.children.iter_mut() {
            match child {
                DataChild::Group(g) => self.resolve_links(caller, g, read_allowed, cache)?,
                DataChild::RecordLink(link) => {
                    link.has_read_action = self.link_is_readable(
                        caller,
                        &link.linked_record_type,
                        &link.linked_record_id,
                        cache,
                    )?;
                }
                DataChild::ResourceLink(resource) => resource.has_read_action = read_allowed,
                DataChild::Atomic(_) => {}
            }
        }
        Ok(())
    }

    fn link_is_readable(
        &self,
        caller: &Caller,
        linked_type: &str,
        linked_id: &str,
        cache: &mut InvocationCache,
    ) -> Result<bool> {
        if self.type_is_public(linked_type, cache)? {
            return Ok(true);
        }
        if let Some(authorized) = cache.links.link_authorized(linked_type, linked_id) {
            trace!(linked_type, linked_id, authorized, "link decision cache hit");
            return Ok(authorized);
        }
        let authorized = self.authorize_link_read(caller, linked_type, linked_id, cache)?;
        Ok(cache
            .links
            .set_link_authorized(linked_type, linked_id, authorized))
    }

    fn type_is_public(&self, record_type: &str, cache: &mut InvocationCache) -> Result<bool> {
        if let Some(public) = cache.links.type_is_public(record_type) {
            return Ok(public);
        }
        let public = cache.descriptor(self.types, record_type)?.is_public_for_read();
        Ok(cache.links.set_type_is_public(record_type, public))
    }

    fn authorize_link_read(
        &self,
        caller: &Caller,
        linked_type: &str,
        linked_id: &str,
        cache: &mut InvocationCache,
    ) -> Result<bool> {
        let types = self.types.implementing_types(linked_type)?;
        let linked = match self.storage.read(&types, linked_id) {
            Ok(linked) => linked,
            Err(e) if e.is_not_found() => {
                debug!(linked_type, linked_id, "link target not found");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let actual_type = linked.record_type().unwrap_or(linked_type);
        let descriptor = cache.descriptor(self.types, actual_type)?;
        if descriptor.is_public_for_read() {
            return Ok(true);
        }
        let terms = self
            .term_collector
            .collect(descriptor.definition_id(), &linked)?;
        Ok(self.authorizer.is_authorized_for_type_and_terms(
            caller,
            Action::Read,
            actual_type,
            &terms.permission_terms,
        ))
    }
}
