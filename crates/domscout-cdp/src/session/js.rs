//! JavaScript execution operations for CDP page session.

use serde_json::{json, Value};

use crate::error::CdpError;
use crate::protocol::{ExceptionDetails, RemoteObject};

use super::core::PageSession;

fn check_exception(result: &Value) -> Result<(), CdpError> {
    match result.get("exceptionDetails") {
        Some(details) => {
            let message = serde_json::from_value::<ExceptionDetails>(details.clone())
                .map(|d| d.message())
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(CdpError::JavaScript(message))
        }
        None => Ok(()),
    }
}

impl PageSession {
    /// Evaluate a JavaScript expression in the main frame.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Call `function` with `this` bound to the remote object; returns the
    /// result by value.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Option<Vec<Value>>,
    ) -> Result<Value, CdpError> {
        let mut params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "returnByValue": true,
            "awaitPromise": true,
        });

        if let Some(a) = args {
            params["arguments"] = json!(a.into_iter().map(|v| json!({"value": v})).collect::<Vec<_>>());
        }

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Like [`call_function_on`](Self::call_function_on) but returns a remote
    /// reference in the same object group as `object_id`.
    pub async fn call_function_on_handle(
        &self,
        object_id: &str,
        function: &str,
    ) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": function,
                    "returnByValue": false,
                })),
            )
            .await?;

        check_exception(&result)?;
        let remote_obj: RemoteObject = serde_json::from_value(result["result"].clone())?;
        Ok(remote_obj)
    }

    pub async fn release_object(&self, object_id: &str) -> Result<(), CdpError> {
        self.call("Runtime.releaseObject", Some(json!({"objectId": object_id})))
            .await?;
        Ok(())
    }

    /// Release every remote object created in `group`.
    pub async fn release_object_group(&self, group: &str) -> Result<(), CdpError> {
        self.call("Runtime.releaseObjectGroup", Some(json!({"objectGroup": group})))
            .await?;
        Ok(())
    }
}
