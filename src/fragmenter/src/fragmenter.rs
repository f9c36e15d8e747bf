use crate::config::FragmenterConfig;
use crate::enumerator::fragment_metadata;
use crate::hosts::{prepare_hosts, HostResolver};
use crate::partition::PartitionPlan;
use crate::predicate::build_fragment_sql;
use common::{Fragment, FragmenterError, FragmentsStats, InputData};

/// Fragmenter for JDBC tables.
///
/// Turns a table name plus the `PARTITION_BY`, `RANGE` and `INTERVAL` user properties into
/// fragments, and later narrows a worker's SQL to one of them:
///
/// ```text
/// PARTITION_BY=createdate:date&RANGE=2008-01-01:2010-01-01&INTERVAL=1:month
/// PARTITION_BY=year:int&RANGE=2008:2010&INTERVAL=1
/// PARTITION_BY=grade:enum&RANGE=excellent:good:general:bad
/// ```
///
/// Without `PARTITION_BY` the whole table is one fragment.
pub struct JdbcPartitionFragmenter {
    /// Request being served.
    input: InputData,
    /// Parsed partition properties, `None` for an unpartitioned table.
    plan: Option<PartitionPlan>,
    config: FragmenterConfig,
    resolver: Box<dyn HostResolver>,
}

impl JdbcPartitionFragmenter {
    /// Creates a fragmenter for a request, validating its partition properties.
    ///
    /// # Arguments
    ///
    /// * `input` - Request with the table name and user properties.
    /// * `config` - Fragmenter settings.
    pub fn new(input: InputData, config: FragmenterConfig) -> Result<Self, FragmenterError> {
        let plan = PartitionPlan::from_input(&input)?;
        let resolver = config.host_resolver();
        Ok(Self {
            input,
            plan,
            config,
            resolver,
        })
    }

    /// Replaces the resolver used for replica addresses.
    pub fn with_resolver(mut self, resolver: Box<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Returns the fragments covering the table, each with the local host as replica.
    ///
    /// Either every fragment is returned or an error is; never a partial list.
    pub fn get_fragments(&self) -> Result<Vec<Fragment>, FragmenterError> {
        let source = self.input.data_source();
        let mut fragments: Vec<Fragment> =
            fragment_metadata(self.plan.as_ref(), self.config.max_fragments)?
                .into_iter()
                .map(|metadata| Fragment::new(source, metadata))
                .collect();
        prepare_hosts(&mut fragments, self.resolver.as_ref())?;
        info!("Produced {} fragments for {}", fragments.len(), source);
        Ok(fragments)
    }

    /// Statistics are not available for JDBC tables.
    pub fn get_fragments_stats(&self) -> Result<FragmentsStats, FragmenterError> {
        Err(FragmenterError::Unsupported(String::from(
            "ANALYZE for Jdbc plugin is not supported",
        )))
    }

    /// Narrows `origin_sql` to the fragment whose metadata the request carries.
    ///
    /// # Arguments
    ///
    /// * `db_name` - Database product name of the remote database.
    /// * `origin_sql` - Query reading the whole table.
    pub fn build_fragmenter_sql(
        &self,
        db_name: &str,
        origin_sql: &str,
    ) -> Result<String, FragmenterError> {
        build_fragment_sql(
            origin_sql,
            db_name,
            self.plan.as_ref(),
            self.input.fragment_metadata(),
        )
    }
}
