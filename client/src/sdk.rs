//! Client-side delivery for only-log calls.

use delivery_types::{ExecutionServer, Insertion, Request, Response, Timing, UserInfo};
use serde::Serialize;
use uuid::Uuid;

/// Answer a request locally: the requested page of insertions in retrieval
/// order, each tagged with a fresh insertion id and its page position.
///
/// `retrieval_insertion_offset` is the position of `request.insertion[0]`
/// within the caller's full result list.
pub(crate) fn deliver_locally(request: &Request, retrieval_insertion_offset: u32) -> Response {
    let start = request
        .paging
        .offset
        .saturating_sub(retrieval_insertion_offset) as usize;

    let insertion = request
        .insertion
        .iter()
        .skip(start)
        .take(request.paging.size as usize)
        .enumerate()
        // Positions past u32::MAX cannot be represented; the page ends there.
        .map_while(|(index, insertion)| {
            let position = request
                .paging
                .offset
                .checked_add(u32::try_from(index).ok()?)?;
            Some(Insertion {
                insertion_id: Some(Uuid::new_v4().to_string()),
                position: Some(position),
                ..insertion.clone()
            })
        })
        .collect();

    Response {
        request_id: Some(Uuid::new_v4().to_string()),
        insertion,
        paging_info: None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LogRequest<'a> {
    pub user_info: &'a UserInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    pub delivery_log: Vec<DeliveryLog<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeliveryLog<'a> {
    pub execution: DeliveryExecution,
    pub request: &'a Request,
    pub response: &'a Response,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeliveryExecution {
    pub execution_server: ExecutionServer,
}

impl<'a> LogRequest<'a> {
    pub(crate) fn for_local_delivery(request: &'a Request, response: &'a Response) -> Self {
        Self {
            user_info: &request.user_info,
            timing: request.timing,
            delivery_log: vec![DeliveryLog {
                execution: DeliveryExecution {
                    execution_server: ExecutionServer::Sdk,
                },
                request,
                response,
            }],
        }
    }
}
