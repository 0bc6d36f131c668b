//! Link decoration.
//!
//! The decorator expands an enhanced record for "read with embedded data"
//! responses: every link the enhancer flagged readable gets the enhanced
//! target record attached, recursively, up to a number of link hops.
//!
//! Depth counts hops from the root record, not group nesting. A cyclic link
//! graph is cut off by the depth bound alone; a record reached along two
//! paths is read twice.

use crate::enhance::RecordEnhancer;
use crate::error::{Error, Result};
use crate::redact::Redactor;
use crate::security::{Authenticator, Caller};
use recordgate_proto::{DataChild, DataGroup, DataRecordLink, EnhancedRecord};
use tracing::{debug, instrument, trace};

/// Materializes readable links of enhanced records.
pub struct RecordDecorator<'a> {
    enhancer: &'a RecordEnhancer<'a>,
    authenticator: &'a dyn Authenticator,
    redactor: &'a dyn Redactor,
}

impl<'a> RecordDecorator<'a> {
    /// Create a decorator enhancing link targets through `enhancer`.
    pub fn new(
        enhancer: &'a RecordEnhancer<'a>,
        authenticator: &'a dyn Authenticator,
        redactor: &'a dyn Redactor,
    ) -> Self {
        Self {
            enhancer,
            authenticator,
            redactor,
        }
    }

    /// Decorate an enhanced record for the caller behind `auth_token`.
    ///
    /// Fails with `AuthenticationFailed` when the token does not resolve.
    #[instrument(skip_all, fields(max_depth = max_depth))]
    pub fn decorate(&self, record: EnhancedRecord, auth_token: &str, max_depth: usize) -> Result<EnhancedRecord> {
        let caller = self.authenticator.caller_for_token(auth_token)?;
        self.decorate_for(&caller, record, max_depth)
    }

    /// Decorate an enhanced record for an already resolved caller.
    pub fn decorate_for(
        &self,
        caller: &Caller,
        mut record: EnhancedRecord,
        max_depth: usize,
    ) -> Result<EnhancedRecord> {
        self.decorate_group(caller, &mut record.record, max_depth)?;
        Ok(record)
    }

    /// Decorate a raw record, enhancing it first.
    ///
    /// Link readability is derived by the enhancement, so records that were
    /// never enhanced can be decorated too.
    pub fn decorate_raw(
        &self,
        record_type: &str,
        record: &DataGroup,
        auth_token: &str,
        max_depth: usize,
    ) -> Result<EnhancedRecord> {
        let caller = self.authenticator.caller_for_token(auth_token)?;
        let enhanced = self
            .enhancer
            .enhance(&caller, record_type, record, self.redactor)?;
        self.decorate_for(&caller, enhanced, max_depth)
    }

    /// Read, enhance and decorate a stored record.
    ///
    /// Uses the configured decoration depth when `max_depth` is `None`.
    /// Fails with `NotFound` or `AuthorizationDenied` for the root record.
    #[instrument(skip(self, auth_token))]
    pub fn read_decorated(
        &self,
        record_type: &str,
        id: &str,
        auth_token: &str,
        max_depth: Option<usize>,
    ) -> Result<EnhancedRecord> {
        let depth = max_depth.unwrap_or(self.enhancer.config().decoration_depth);
        let types = self.enhancer.types().implementing_types(record_type)?;
        let record = self.enhancer.storage().read(&types, id)?;
        let actual_type = record.record_type().unwrap_or(record_type).to_string();
        self.decorate_raw(&actual_type, &record, auth_token, depth)
    }

    fn decorate_group(&self, caller: &Caller, group: &mut DataGroup, depth_left: usize) -> Result<()> {
        for child in group.children.iter_mut() {
            match child {
                DataChild::Group(g) => self.decorate_group(caller, g, depth_left)?,
                DataChild::RecordLink(link) => self.decorate_link(caller, link, depth_left)?,
                DataChild::Atomic(_) | DataChild::ResourceLink(_) => {}
            }
        }
        Ok(())
    }

    fn decorate_link(&self, caller: &Caller, link: &mut DataRecordLink, depth_left: usize) -> Result<()> {
        if !link.has_read_action {
            return Ok(());
        }
        if depth_left == 0 {
            trace!(
                linked_type = %link.linked_record_type,
                linked_id = %link.linked_record_id,
                "depth exhausted"
            );
            return Ok(());
        }

        let Some(mut target) = self.enhance_target(caller, link)? else {
            return Ok(());
        };
        self.decorate_group(caller, &mut target.record, depth_left - 1)?;
        link.linked_record = Some(Box::new(target.record));
        Ok(())
    }

    /// Read and enhance a link target; `None` when it is gone or unreadable.
    fn enhance_target(&self, caller: &Caller, link: &DataRecordLink) -> Result<Option<EnhancedRecord>> {
        let types = self
            .enhancer
            .types()
            .implementing_types(&link.linked_record_type)?;
        let target = match self.enhancer.storage().read(&types, &link.linked_record_id) {
            Ok(target) => target,
            Err(e) if e.is_not_found() => {
                debug!(
                    linked_type = %link.linked_record_type,
                    linked_id = %link.linked_record_id,
                    "link target disappeared"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let actual_type = target
            .record_type()
            .unwrap_or(&link.linked_record_type)
            .to_string();
        match self
            .enhancer
            .enhance(caller, &actual_type, &target, self.redactor)
        {
            Ok(enhanced) => Ok(Some(enhanced)),
            Err(Error::AuthorizationDenied(denied)) => {
                debug!(%denied, linked_id = %link.linked_record_id, "link target not readable");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
