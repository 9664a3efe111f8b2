//! Typed wrappers over the Printess REST resources.
//!
//! Every call is a `POST` of a JSON body to a fixed path; the response is
//! mapped onto the matching type from [`crate::types`].

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{
    Directory, Filters, JobStatus, PrintessClient, ProduceJob, Result, SimpleJobStatus,
    UserTemplates,
};

/// Production jobs and their status.
#[derive(Clone, Copy, Debug)]
pub struct ProductionEndpoint<'a> {
    client: &'a PrintessClient,
}

impl<'a> ProductionEndpoint<'a> {
    pub(crate) fn new(client: &'a PrintessClient) -> Self {
        Self { client }
    }

    /// Creates a production job.
    pub async fn produce<B>(&self, data: &B, filters: &Filters) -> Result<ProduceJob>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .create_resource("production/produce", data, filters, "produce job")
            .await
    }

    /// Full status of a job, including output URLs once it is finished.
    pub async fn get_status<B>(&self, data: &B, filters: &Filters) -> Result<JobStatus>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .create_resource("production/status/get", data, filters, "job status")
            .await
    }

    /// Status of a job reduced to the list of produced PDFs.
    pub async fn get_simple_status<B>(&self, data: &B, filters: &Filters) -> Result<SimpleJobStatus>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .create_resource("production/status/pdf/get", data, filters, "simple job status")
            .await
    }
}

/// The user's directory tree.
#[derive(Clone, Copy, Debug)]
pub struct DirectoriesEndpoint<'a> {
    client: &'a PrintessClient,
}

impl<'a> DirectoriesEndpoint<'a> {
    pub(crate) fn new(client: &'a PrintessClient) -> Self {
        Self { client }
    }

    pub async fn load<B>(&self, data: &B, filters: &Filters) -> Result<Directory>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .create_resource("directories/load", data, filters, "directory")
            .await
    }
}

/// Templates, their details and form fields.
#[derive(Clone, Copy, Debug)]
pub struct TemplatesEndpoint<'a> {
    client: &'a PrintessClient,
}

impl<'a> TemplatesEndpoint<'a> {
    pub(crate) fn new(client: &'a PrintessClient) -> Self {
        Self { client }
    }

    /// Templates of one directory, e.g. `{"directoryId": 211}`.
    pub async fn load_from_user<B>(&self, data: &B, filters: &Filters) -> Result<UserTemplates>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .create_resource("templates/user/load", data, filters, "user templates")
            .await
    }

    pub async fn load_details<B>(&self, data: &B, filters: &Filters) -> Result<JsonValue>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .create_resource("template/details", data, filters, "template details")
            .await
    }

    pub async fn load_form_fields<B>(&self, data: &B, filters: &Filters) -> Result<JsonValue>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .create_resource("template/formFields", data, filters, "template form fields")
            .await
    }
}
