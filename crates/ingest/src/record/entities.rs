/// 거래 결과 엔티티 모듈
pub mod trading_result {
    use sea_orm::entity::prelude::*;
    use sea_orm::sea_query::Expr;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "spimex_trading_results")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = true)]
        pub id: i64,

        /// 거래소 상품 코드 (예: "A100ANK060F")
        #[sea_orm(column_type = "Text")]
        pub exchange_product_id: String,

        #[sea_orm(column_type = "Text")]
        pub exchange_product_name: String,

        /// 상품 코드 앞 4글자
        #[sea_orm(column_type = "Text")]
        pub oil_id: String,

        /// 상품 코드 5~7번째 글자
        #[sea_orm(column_type = "Text")]
        pub delivery_basis_id: String,

        #[sea_orm(column_type = "Text")]
        pub delivery_basis_name: String,

        /// 상품 코드 마지막 글자
        #[sea_orm(column_type = "Text")]
        pub delivery_type_id: String,

        /// 계약 물량 (톤)
        #[sea_orm(column_type = "Double")]
        pub volume: f64,

        /// 계약 금액 (루블)
        #[sea_orm(column_type = "Double")]
        pub total: f64,

        /// 계약 건수
        #[sea_orm(column_type = "Double")]
        pub count: f64,

        /// 거래일
        pub date: Date,

        /// 저장소가 채운다
        #[sea_orm(default_expr = "Expr::current_timestamp()")]
        pub created_at: DateTime,

        #[sea_orm(default_expr = "Expr::current_timestamp()")]
        pub updated_at: DateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
