crate::hresult_mapping! {
    HResultKind,
    ( S_OK, 0x0000_0000, "The operation completed successfully" );
    ( S_FALSE, 0x0000_0001, "The operation completed with a false result" );
    ( E_NOTIMPL, 0x8000_4001, "Not implemented" );
    ( E_NOINTERFACE, 0x8000_4002, "No such interface supported" );
    ( E_POINTER, 0x8000_4003, "Invalid pointer" );
    ( E_ABORT, 0x8000_4004, "Operation aborted" );
    ( E_FAIL, 0x8000_4005, "Unspecified error" );
    ( E_UNEXPECTED, 0x8000_FFFF, "Catastrophic failure" );
    ( E_ACCESSDENIED, 0x8007_0005, "Access is denied" );
    ( E_OUTOFMEMORY, 0x8007_000E, "Not enough memory resources are available" );
    ( E_INVALIDARG, 0x8007_0057, "One or more arguments are invalid" );
    ( DISP_E_UNKNOWNINTERFACE, 0x8002_0001, "Unknown interface" );
    ( DISP_E_MEMBERNOTFOUND, 0x8002_0003, "Member not found" );
    ( DISP_E_PARAMNOTFOUND, 0x8002_0004, "Parameter not found" );
    ( DISP_E_TYPEMISMATCH, 0x8002_0005, "Type mismatch" );
    ( DISP_E_UNKNOWNNAME, 0x8002_0006, "Unknown name" );
    ( DISP_E_BADVARTYPE, 0x8002_0008, "Bad variable type" );
    ( DISP_E_EXCEPTION, 0x8002_0009, "Exception occurred" );
    ( DISP_E_OVERFLOW, 0x8002_000A, "Out of present range" );
    ( DISP_E_BADINDEX, 0x8002_000B, "Invalid index" );
    ( DISP_E_BADPARAMCOUNT, 0x8002_000E, "Invalid number of parameters" );
    ( DISP_E_PARAMNOTOPTIONAL, 0x8002_000F, "Parameter not optional" );
    ( REGDB_E_CLASSNOTREG, 0x8004_0154, "Class not registered" );
    ( CO_E_NOTINITIALIZED, 0x8004_01F0, "CoInitialize has not been called" );
    ( CO_E_CLASSSTRING, 0x8004_01F3, "Invalid class string" );
    /* ADO ErrorValueEnum, facility control */
    ( AD_E_NO_CURRENT_RECORD, 0x800A_0BCD, "Either BOF or EOF is True, or the current record has been deleted" );
    ( AD_E_ILLEGAL_OPERATION, 0x800A_0C93, "Operation is not allowed in this context" );
    ( AD_E_ITEM_NOT_FOUND, 0x800A_0CC1, "Item cannot be found in the collection" );
    ( AD_E_OBJECT_CLOSED, 0x800A_0E78, "Operation is not allowed when the object is closed" );
    ( AD_E_OBJECT_OPEN, 0x800A_0E79, "Operation is not allowed when the object is open" );
    ( AD_E_PROVIDER_NOT_FOUND, 0x800A_0E7A, "Provider cannot be found" );
    ( AD_E_INVALID_CONNECTION, 0x800A_0E7D, "The connection cannot be used to perform this operation" );
}

impl HResultKind {
    /// `true` for success codes (severity bit clear).
    pub fn is_success(&self) -> bool {
        self.code() & 0x8000_0000 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
    struct TestStruct {
        kind: HResultKind,
        msg: String,
    }

    #[test]
    fn test_hresult_kind() {
        let test_struct = TestStruct {
            kind: HResultKind::DISP_E_MEMBERNOTFOUND,
            msg: "test".to_string(),
        };
        let test_struct_string = serde_json::to_value(&test_struct).unwrap().to_string();
        let test_struct: TestStruct = serde_json::from_str(&test_struct_string).unwrap();
        assert_eq!(test_struct.kind, HResultKind::DISP_E_MEMBERNOTFOUND);
        assert_eq!(test_struct.kind.to_string(), "DISP_E_MEMBERNOTFOUND");
        assert_eq!(test_struct.kind.code(), 0x8002_0003);

        assert_eq!(
            get_obj_by_code(0x800A_0E78).unwrap(),
            HResultKind::AD_E_OBJECT_CLOSED
        );
        assert!(get_obj_by_code(0x1234_5678).is_none());
    }

    #[test]
    fn test_is_success() {
        assert!(HResultKind::S_OK.is_success());
        assert!(HResultKind::S_FALSE.is_success());
        assert!(!HResultKind::E_FAIL.is_success());
        assert!(!HResultKind::AD_E_NO_CURRENT_RECORD.is_success());
    }
}
